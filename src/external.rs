use crate::command::{Argv, os_str};
use crate::error::LaunchError;
use std::borrow::Cow;
use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Search path used when `PATH` is not set, as `execvp` does.
const DEFAULT_SEARCH_PATH: &str = "/bin:/usr/bin";

/// A program that is not a builtin, resolved and ready to run.
///
/// The child inherits the shell's standard streams, working directory and
/// environment. Its `argv[0]` is the name exactly as typed.
#[derive(Debug)]
pub struct ExternalCommand<'a> {
    program: PathBuf,
    argv: &'a [&'a [u8]],
}

impl<'a> ExternalCommand<'a> {
    /// Resolve `argv[0]` against `search_paths` (a `PATH`-style list).
    ///
    /// `argv` must not be empty.
    pub fn resolve(argv: &'a [&'a [u8]], search_paths: &OsStr) -> Result<Self, LaunchError> {
        let name = argv.first().copied().unwrap_or_default();
        match find_command_path(search_paths, Path::new(&*os_str(name))) {
            Some(program) => Ok(Self {
                program: program.into_owned(),
                argv,
            }),
            None => Err(LaunchError::NotFound(
                String::from_utf8_lossy(name).into_owned(),
            )),
        }
    }

    /// Resolve against the process's own `PATH`.
    pub fn from_env(argv: &'a Argv<'a>) -> Result<Self, LaunchError> {
        let search_paths =
            env::var_os("PATH").unwrap_or_else(|| OsString::from(DEFAULT_SEARCH_PATH));
        Self::resolve(argv, &search_paths)
    }

    /// Spawn the program and block until it exits or is killed by a signal.
    pub fn run(self) -> Result<ExitStatus, LaunchError> {
        let name = self.argv.first().copied().unwrap_or_default();
        let io_error = |source: io::Error| LaunchError::Io {
            name: String::from_utf8_lossy(name).into_owned(),
            source,
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(self.argv.iter().skip(1).copied().map(os_str));
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(os_str(name));
        }

        let mut child = cmd.spawn().map_err(io_error)?;
        debug!(pid = child.id(), program = %self.program.display(), "spawned child");

        // waitpid without WUNTRACED: a stopped child is not reported, so this
        // only returns once the child has exited or been killed.
        let status = child.wait().map_err(io_error)?;
        match status.code() {
            Some(code) => debug!(pid = child.id(), code, "child exited"),
            None => debug!(pid = child.id(), signal = ?terminating_signal(status), "child killed"),
        }
        Ok(status)
    }
}

#[cfg(unix)]
fn terminating_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Resolve a command path the way a typical shell would.
///
/// - Absolute path, or a relative one with several components (`bin/sh`,
///   `./foo`): returned if it exists.
/// - Single component: the first executable file named so in a directory of
///   `search_paths`.
/// - Empty path: `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(x), None) if x.as_os_str() == path.as_os_str() => {
            find_in_path(search_paths, x.as_os_str()).map(Cow::Owned)
        }
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_executable(candidate))
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
