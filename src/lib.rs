//! # huffman_text
//!
//! Huffman coding that writes its output as text: a code table with one
//! `<symbol><codeword>` line per byte value, an empty line, then the payload
//! as literal `'0'`/`'1'` characters.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffman_text::HuffmanCodec;
//!
//! let mut codec = HuffmanCodec::new();
//! let encoded = codec.encode_bytes(b"aabbbcc")?;
//! assert_eq!(encoded, b"a01\nb1\nc00\n\n01011110000");
//!
//! let decoded = codec.decode_bytes(&encoded)?;
//! assert_eq!(decoded, b"aabbbcc");
//! # Ok::<(), huffman_text::HuffmanError>(())
//! ```
//!
//! Files go through [`HuffmanCodec::encode_file`] and
//! [`HuffmanCodec::decode_file`], which write `<stem>_encoded.txt` and
//! `<stem>_decoded.txt` next to the input.

pub mod code_table;
pub mod config;
pub mod error;
pub mod huffman_codec;
pub mod hufftree;
pub mod paths;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use code_table::CodeTable;
pub use config::{CodecOptions, TrailingBits};
pub use error::{HuffmanError, Result};
pub use huffman_codec::HuffmanCodec;
pub use hufftree::{HuffNode, HuffmanTree};
