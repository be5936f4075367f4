use rustyline::error::ReadlineError;
use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Conditions that end the whole shell process.
///
/// Everything else a command can run into is reported on the error stream and
/// the loop goes on; these propagate to `main`, which exits with a failure
/// status.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A line or token buffer could not grow.
    #[error("allocation error")]
    Allocation(#[from] TryReserveError),
    /// The shell's own input or output stream failed.
    #[error("{0}")]
    Io(#[from] io::Error),
    /// The interactive line editor failed for a reason other than end-of-input.
    #[error("line editor: {0}")]
    Editor(#[from] ReadlineError),
}

/// Why an external program could not be run.
///
/// Reported as a diagnostic; the shell keeps going.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No executable by that name on the search path.
    #[error("{0}: command not found")]
    NotFound(String),
    /// The OS refused to start the program, or waiting on it failed.
    #[error("{name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}
