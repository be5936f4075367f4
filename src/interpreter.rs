use crate::builtin::BuiltinRegistry;
use crate::command::{Argv, Continuation};
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::lexer::split_into_tokens;
use crate::reader::{Input, LineSource};
use std::fmt::Display;
use std::io::Write;
use tracing::debug;

/// Prompt shown before every read unless configured otherwise.
pub const DEFAULT_PROMPT: &str = "> ";

/// Prefix of every diagnostic written to the error stream.
pub const DIAGNOSTIC_PREFIX: &str = "minish";

/// How [`Interpreter::run`] came to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The `exit` builtin was run.
    Exit,
    /// The input ended before a complete line was read.
    EndOfInput,
}

/// Reads command lines and runs them, one at a time.
///
/// Commands are looked up in a [`BuiltinRegistry`] first; anything else is
/// started as an external program and waited for.
///
/// Example
/// ```
/// use minish::{Continuation, Interpreter, lexer::split_into_tokens};
/// let sh = Interpreter::default();
/// let argv = split_into_tokens(b"echo hello world").unwrap();
/// let mut out = Vec::new();
/// let signal = sh.execute(&argv, &mut out, &mut std::io::sink()).unwrap();
/// assert_eq!(signal, Continuation::Continue);
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    builtins: BuiltinRegistry,
    prompt: String,
}

impl Interpreter {
    pub fn new(builtins: BuiltinRegistry) -> Self {
        Self {
            builtins,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    /// Replace the prompt string.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Run one tokenized command line.
    ///
    /// A blank line does nothing. Failures of the command itself are written
    /// to `stderr` and yield [`Continuation::Continue`]; only a failure to
    /// write to the shell's own streams is returned as an error.
    pub fn execute(
        &self,
        argv: &Argv<'_>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Continuation, ShellError> {
        let Some(name) = argv.name() else {
            return Ok(Continuation::Continue);
        };

        if let Some(builtin) = self.builtins.get(name) {
            debug!(name = %String::from_utf8_lossy(name), "running builtin");
            return match builtin.execute(argv, stdout) {
                Ok(signal) => Ok(signal),
                Err(e) => {
                    report(stderr, format_args!("{:#}", e))?;
                    Ok(Continuation::Continue)
                }
            };
        }

        // The child writes straight to the inherited descriptor.
        stdout.flush()?;
        debug!(name = %String::from_utf8_lossy(name), "launching external command");
        if let Err(e) = ExternalCommand::from_env(argv).and_then(ExternalCommand::run) {
            report(stderr, e)?;
        }
        Ok(Continuation::Continue)
    }

    /// Prompt, read, tokenize and dispatch until `exit` or end of input.
    ///
    /// Each line and the tokens borrowed from it are dropped once the command
    /// has finished.
    pub fn run(
        &self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Shutdown, ShellError> {
        loop {
            let line = match source.read_line(&self.prompt, stdout)? {
                Input::Line(line) => line,
                Input::EndOfInput => {
                    debug!("end of input");
                    return Ok(Shutdown::EndOfInput);
                }
            };
            let argv = split_into_tokens(&line)?;
            if self.execute(&argv, stdout, stderr)? == Continuation::Terminate {
                debug!("exit requested");
                return Ok(Shutdown::Exit);
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(BuiltinRegistry::default())
    }
}

fn report(stderr: &mut dyn Write, message: impl Display) -> Result<(), ShellError> {
    writeln!(stderr, "{}: {}", DIAGNOSTIC_PREFIX, message)?;
    stderr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::StreamReader;
    use crate::testing::{CwdGuard, lock_current_dir};
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Session {
        shutdown: Shutdown,
        stdout: String,
        stderr: String,
    }

    fn session(input: &str) -> Session {
        session_bytes(input.as_bytes())
    }

    fn session_bytes(input: &[u8]) -> Session {
        let sh = Interpreter::default();
        let mut source = StreamReader::new(Cursor::new(input.to_vec()));
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let shutdown = sh.run(&mut source, &mut stdout, &mut stderr).unwrap();
        Session {
            shutdown,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        }
    }

    #[test]
    fn test_echo_session() {
        let s = session("echo a b c\n");
        assert_eq!(s.stdout, "> a b c\n> ");
        assert!(s.stderr.is_empty());
        assert_eq!(s.shutdown, Shutdown::EndOfInput);
    }

    #[test]
    fn test_end_of_input_at_first_prompt() {
        let s = session("");
        assert_eq!(s.stdout, "> ");
        assert!(s.stderr.is_empty());
        assert_eq!(s.shutdown, Shutdown::EndOfInput);
    }

    #[test]
    fn test_empty_lines_only_reprompt() {
        let s = session("\n   \n\t\n");
        assert_eq!(s.stdout, "> > > > ");
        assert!(s.stderr.is_empty());
    }

    #[test]
    fn test_exit_stops_before_remaining_lines() {
        let s = session("exit now\necho unreachable\n");
        assert_eq!(s.shutdown, Shutdown::Exit);
        assert_eq!(s.stdout, "> ");
    }

    #[test]
    fn test_usage_errors_are_reported_and_loop_continues() {
        let s = session("cd\nmkdir\necho still here\n");
        assert_eq!(
            s.stderr,
            "minish: expected argument to \"cd\"\nminish: expected argument to \"mkdir\"\n"
        );
        assert!(s.stdout.ends_with("still here\n> "));
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let s = session("doesnotexist123 --flag\necho ok\n");
        assert_eq!(s.stderr, "minish: doesnotexist123: command not found\n");
        assert!(s.stdout.contains("ok\n"));
        assert_eq!(s.shutdown, Shutdown::EndOfInput);
    }

    #[test]
    fn test_cd_nonexistent_reports_system_error() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let s = session("cd /nonexistent-path-for-minish-tests\n");
        assert!(s.stderr.starts_with("minish: cd: /nonexistent-path-for-minish-tests: "));
        assert_eq!(s.stderr.lines().count(), 1);
        assert_eq!(std::env::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_mkdir_twice_then_cd_into_it() {
        let _lock = lock_current_dir();
        let tmp = TempDir::new().unwrap();
        let _cwd = CwdGuard::enter(tmp.path());

        let s = session("mkdir newdir\nmkdir newdir\ncd newdir\nmkdir inner\n");
        assert!(s.stderr.starts_with("minish: mkdir: newdir: "));
        assert_eq!(s.stderr.lines().count(), 1);
        assert!(tmp.path().join("newdir").join("inner").is_dir());
        assert!(!tmp.path().join("inner").exists());
    }

    #[test]
    fn test_unterminated_line_at_end_of_input_is_not_run() {
        let _lock = lock_current_dir();
        let tmp = TempDir::new().unwrap();
        let _cwd = CwdGuard::enter(tmp.path());

        let s = session("mkdir created_at_eof");
        assert_eq!(s.stdout, "> ");
        assert!(s.stderr.is_empty());
        assert_eq!(s.shutdown, Shutdown::EndOfInput);
        assert!(!tmp.path().join("created_at_eof").exists());

        let s = session("echo kept\nexit");
        assert_eq!(s.stdout, "> kept\n> ");
        assert_eq!(s.shutdown, Shutdown::EndOfInput);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_directory_name_is_created_verbatim() {
        use std::os::unix::ffi::OsStrExt;
        let _lock = lock_current_dir();
        let tmp = TempDir::new().unwrap();
        let _cwd = CwdGuard::enter(tmp.path());

        let s = session_bytes(b"mkdir a\xffb\n");
        assert!(s.stderr.is_empty());
        let names: Vec<Vec<u8>> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().as_bytes().to_vec())
            .collect();
        assert_eq!(names, vec![b"a\xffb".to_vec()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_external_failures_do_not_stop_the_loop() {
        let s = session("false\nsh -c false\necho after\n");
        assert!(s.stdout.ends_with("after\n> "));
        assert_eq!(s.shutdown, Shutdown::EndOfInput);
    }

    #[test]
    fn test_custom_prompt() {
        let sh = Interpreter::default().with_prompt("$ ");
        let mut source = StreamReader::new(Cursor::new(b"echo x\n".to_vec()));
        let mut out = Vec::new();
        sh.run(&mut source, &mut out, &mut Vec::new()).unwrap();
        assert_eq!(out, b"$ x\n$ ");
    }

    #[test]
    fn test_execute_blank_argv_is_noop() {
        let sh = Interpreter::default();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let signal = sh.execute(&Argv::default(), &mut out, &mut err).unwrap();
        assert_eq!(signal, Continuation::Continue);
        assert!(out.is_empty() && err.is_empty());
    }
}
