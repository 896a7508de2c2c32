//! Reads the two input sequences from a stream.

use std::io::{self, Read};

use thiserror::Error;

use crate::bioseq::{SeqError, Sequence};

/// Reads two whitespace-separated sequences from `input`. Any mix of spaces,
/// tabs, and newlines separates them; content after the second sequence is
/// ignored.
pub fn read_two_sequences(input: &mut dyn Read) -> Result<(Sequence, Sequence), ReadError> {
    let mut buffer = String::new();
    input.read_to_string(&mut buffer)?;

    let mut tokens = buffer.split_whitespace();
    let first = tokens
        .next()
        .ok_or(ReadError::MissingSequence { found: 0 })?;
    let second = tokens
        .next()
        .ok_or(ReadError::MissingSequence { found: 1 })?;

    Ok((Sequence::new(first)?, Sequence::new(second)?))
}

/// Error type for sequence input.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read input sequences")]
    Io(#[from] io::Error),
    #[error("expected two whitespace-separated sequences but found only {found}")]
    MissingSequence { found: usize },
    #[error(transparent)]
    Seq(#[from] SeqError),
}
