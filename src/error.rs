//! Error types for encoding and decoding.

use std::path::PathBuf;

use thiserror::Error;

use crate::min_heap::HeapErr;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Debug, Error)]
pub enum HuffmanError {
    /// Source file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error from an underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Priority queue misuse while building the tree.
    #[error("heap error: {0}")]
    Heap(#[from] HeapErr),

    /// A code table line carried a symbol but no codeword.
    #[error("code table line {line}: empty codeword for symbol 0x{symbol:02x}")]
    EmptyCodeword { line: usize, symbol: u8 },

    /// A codeword held something other than '0' or '1'.
    #[error("code table line {line}: invalid codeword byte 0x{byte:02x}")]
    InvalidCodeword { line: usize, byte: u8 },

    /// A codeword longer than any 256-symbol tree can produce.
    #[error("code table line {line}: codeword of {len} bits is too long")]
    CodewordTooLong { line: usize, len: usize },

    /// The same symbol appeared on two table lines.
    #[error("code table line {line}: symbol 0x{symbol:02x} listed twice")]
    DuplicateSymbol { line: usize, symbol: u8 },

    /// A codeword duplicates or is a prefix of another codeword.
    #[error("code table line {line}: codeword {codeword:?} collides with an existing code")]
    CodeCollision { line: usize, codeword: String },

    /// Payload held a byte that is neither a bit character nor whitespace.
    #[error("invalid payload byte 0x{byte:02x} at offset {offset}")]
    InvalidPayload { byte: u8, offset: usize },

    /// Payload bits that never matched a codeword.
    #[error("truncated or corrupted payload: {leftover:?} matches no codeword")]
    TruncatedPayload { leftover: String },

    /// A source byte had no codeword on the second encoding pass.
    #[error("byte 0x{0:02x} not in code table")]
    UnknownSymbol(u8),
}

impl HuffmanError {
    /// True for errors caused by a malformed code table or payload.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            HuffmanError::EmptyCodeword { .. }
                | HuffmanError::InvalidCodeword { .. }
                | HuffmanError::CodewordTooLong { .. }
                | HuffmanError::DuplicateSymbol { .. }
                | HuffmanError::CodeCollision { .. }
                | HuffmanError::InvalidPayload { .. }
                | HuffmanError::TruncatedPayload { .. }
        )
    }
}
