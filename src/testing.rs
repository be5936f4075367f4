use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serialises tests that read or change the process working directory.
pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Restores the working directory it saw on creation when dropped.
pub(crate) struct CwdGuard {
    saved: PathBuf,
}

impl CwdGuard {
    pub(crate) fn save() -> Self {
        Self {
            saved: env::current_dir().unwrap(),
        }
    }

    pub(crate) fn enter(dir: impl AsRef<Path>) -> Self {
        let guard = Self::save();
        env::set_current_dir(dir).unwrap();
        guard
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        env::set_current_dir(&self.saved).ok();
    }
}
