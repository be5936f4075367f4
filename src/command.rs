use anyhow::Result;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::Write;
use std::ops::Deref;

/// Outcome of running one command: whether the loop should keep reading.
///
/// Builtins and external programs alike report one of these; an external
/// program's exit code never reaches the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Terminate,
}

/// Ordered tokens of one input line, the first being the command name.
///
/// Tokens are the raw bytes the user typed and borrow from the line they
/// were split out of, so an `Argv` cannot outlive that line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Argv<'line> {
    tokens: Vec<&'line [u8]>,
}

impl<'line> Argv<'line> {
    pub(crate) fn from_tokens(tokens: Vec<&'line [u8]>) -> Self {
        Self { tokens }
    }

    /// The command name, or `None` for a blank line.
    pub fn name(&self) -> Option<&'line [u8]> {
        self.tokens.first().copied()
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[&'line [u8]] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// The first argument after the command name, if any.
    pub fn first_arg(&self) -> Option<&'line [u8]> {
        self.tokens.get(1).copied()
    }
}

impl<'line> Deref for Argv<'line> {
    type Target = [&'line [u8]];

    fn deref(&self) -> &Self::Target {
        &self.tokens
    }
}

/// A token as an OS string, byte for byte on Unix.
#[cfg(unix)]
pub fn os_str(token: &[u8]) -> Cow<'_, OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(OsStr::from_bytes(token))
}

/// A token as an OS string; bytes that are not UTF-8 are replaced.
#[cfg(not(unix))]
pub fn os_str(token: &[u8]) -> Cow<'_, OsStr> {
    match String::from_utf8_lossy(token) {
        Cow::Borrowed(s) => Cow::Borrowed(OsStr::new(s)),
        Cow::Owned(s) => Cow::Owned(s.into()),
    }
}

/// A command implemented inside the shell process.
///
/// Implementations write their regular output to `stdout` and return an
/// error for anything that should be reported as a diagnostic. None of them
/// spawn processes.
pub trait Builtin {
    /// Exact, case-sensitive name the command is invoked by.
    fn name(&self) -> &'static str;

    /// Runs the command with the full argument vector (`argv[0]` is the name).
    fn execute(&self, argv: &Argv<'_>, stdout: &mut dyn Write) -> Result<Continuation>;
}
