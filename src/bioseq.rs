//! Input sequences and their validation.

use thiserror::Error;

/// A sequence to align: a run of non-whitespace ASCII characters.
///
/// The empty sequence is accepted; aligning against it is well defined (the
/// other sequence pairs off against gap characters). Case is preserved and
/// significant: `'a'` does not match `'A'`.
#[derive(Clone, PartialEq, Eq)]
pub struct Sequence {
    bytes: Vec<u8>,
}

impl Sequence {
    /// Creates a sequence from a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use pairalign::bioseq::Sequence;
    /// let seq = Sequence::new("GATTACA").unwrap();
    /// assert_eq!(7, seq.len());
    /// assert!(Sequence::new("GAT TACA").is_err());
    /// assert!(Sequence::new("φ").is_err());
    /// ```
    pub fn new(string: &str) -> Result<Self, SeqError> {
        if !string.is_ascii() {
            return Err(SeqError::NonAscii);
        }
        if string.bytes().any(|b| b.is_ascii_whitespace()) {
            return Err(SeqError::EmbeddedWhitespace);
        }
        Ok(Self {
            bytes: string.as_bytes().to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // bytes are validated ASCII
        f.write_str(std::str::from_utf8(&self.bytes).expect("sequence holds ASCII"))
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sequence({self})")
    }
}

/// Error type for sequence construction.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum SeqError {
    #[error("sequences must consist of ASCII characters")]
    NonAscii,
    #[error("sequences must not contain whitespace")]
    EmbeddedWhitespace,
}
