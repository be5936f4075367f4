use crate::command::Argv;
use crate::error::ShellError;
use tracing::trace;

/// Initial token capacity, and the step by which it grows.
const TOKEN_CHUNK: usize = 64;

/// Bytes that separate tokens: space, tab, carriage return, newline and bell.
const DELIMITERS: [u8; 5] = [b' ', b'\t', b'\r', b'\n', 0x07];

fn is_delimiter(b: &u8) -> bool {
    DELIMITERS.contains(b)
}

/// Split a line into maximal runs of non-delimiter bytes.
///
/// There is no quoting or escaping: `"a b"` yields the two tokens `"a` and
/// `b"`. Token bytes are kept exactly as read. A blank line yields an empty
/// [`Argv`].
pub fn split_into_tokens(line: &[u8]) -> Result<Argv<'_>, ShellError> {
    let mut tokens = Vec::new();
    tokens.try_reserve_exact(TOKEN_CHUNK)?;

    for token in line.split(is_delimiter).filter(|t| !t.is_empty()) {
        if tokens.len() == tokens.capacity() {
            trace!(capacity = tokens.capacity(), "growing token buffer");
            tokens.try_reserve_exact(TOKEN_CHUNK)?;
        }
        tokens.push(token);
    }

    Ok(Argv::from_tokens(tokens))
}
