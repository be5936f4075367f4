//! A minimal interactive command interpreter.
//!
//! Each line read from the input is split on whitespace into an argument
//! vector. The first token names either one of seven builtins (`echo`, `pwd`,
//! `ls`, `mkdir`, `cd`, `help`, `exit`) or an external program, which is
//! spawned with the shell's streams and waited for.
//!
//! The main entry point is [`Interpreter`]. [`reader`] provides the line
//! sources it reads from, and [`command`] the types commands are built on.

mod builtin;
pub mod command;
pub mod error;
mod external;
mod interpreter;
pub mod lexer;
pub mod reader;
#[cfg(test)]
mod testing;

pub use builtin::BuiltinRegistry;
pub use command::{Argv, Builtin, Continuation};
pub use error::{LaunchError, ShellError};
pub use external::{ExternalCommand, find_command_path};
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{DEFAULT_PROMPT, DIAGNOSTIC_PREFIX, Interpreter, Shutdown};
