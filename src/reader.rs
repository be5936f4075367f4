use crate::error::ShellError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::TryReserveError;
use std::io::{BufRead, ErrorKind, Write};
use tracing::trace;

/// Initial line capacity in bytes, and the step by which it grows.
const LINE_CHUNK: usize = 1024;

/// Result of asking a [`LineSource`] for the next command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// One line without its terminator, bytes exactly as read.
    Line(Vec<u8>),
    /// The stream ended before a line terminator was read.
    ///
    /// Any bytes read since the last terminator are dropped, not run.
    EndOfInput,
}

/// Somewhere command lines come from.
pub trait LineSource {
    /// Show `prompt` and read the next line.
    ///
    /// Sources that echo their own prompt ignore `stdout`.
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Input, ShellError>;
}

/// Reads lines from any buffered byte stream, e.g. piped standard input.
pub struct StreamReader<R> {
    input: R,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineSource for StreamReader<R> {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Input, ShellError> {
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = Vec::new();
        line.try_reserve_exact(LINE_CHUNK)?;

        loop {
            let available = match self.input.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                if !line.is_empty() {
                    trace!(len = line.len(), "dropping unterminated line");
                }
                return Ok(Input::EndOfInput);
            }

            let (chunk, consumed, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => (&available[..end], end + 1, true),
                None => (available, available.len(), false),
            };
            grow_to_fit(&mut line, chunk.len())?;
            line.extend_from_slice(chunk);
            self.input.consume(consumed);

            if complete {
                break;
            }
        }

        Ok(Input::Line(line))
    }
}

/// Make room for `extra` more bytes, growing capacity in whole chunks.
fn grow_to_fit(line: &mut Vec<u8>, extra: usize) -> Result<(), TryReserveError> {
    let needed = line.len() + extra;
    if needed > line.capacity() {
        let target = needed.div_ceil(LINE_CHUNK) * LINE_CHUNK;
        trace!(from = line.capacity(), to = target, "growing line buffer");
        line.try_reserve_exact(target - line.len())?;
    }
    Ok(())
}

/// Interactive source backed by a `rustyline` editor.
///
/// History lives only as long as the editor; nothing is written to disk.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self, ShellError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorReader {
    fn read_line(&mut self, prompt: &str, _stdout: &mut dyn Write) -> Result<Input, ShellError> {
        let read = self.editor.readline(prompt);
        if let Ok(line) = &read
            && !line.trim().is_empty()
        {
            self.editor.add_history_entry(line.as_str())?;
        }
        map_readline(read)
    }
}

fn map_readline(read: Result<String, ReadlineError>) -> Result<Input, ShellError> {
    match read {
        Ok(line) => Ok(Input::Line(line.into_bytes())),
        // Ctrl-C drops whatever was typed and shows a fresh prompt.
        Err(ReadlineError::Interrupted) => Ok(Input::Line(Vec::new())),
        Err(ReadlineError::Eof) => Ok(Input::EndOfInput),
        Err(err) => Err(err.into()),
    }
}
