use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::config::{CodecOptions, TrailingBits};
use crate::error::{HuffmanError, Result};
use crate::hufftree::HuffmanTree;
use crate::paths;

/// Decoded symbols are handed to the sink in chunks of this size.
const OUTPUT_CHUNK: usize = 8 * 1024;

/// Encodes sources into a code table plus '0'/'1' payload, and back.
///
/// The codec keeps the tree from its most recent call; every encode or
/// decode throws it away and builds a new one.
#[derive(Debug, Default)]
pub struct HuffmanCodec {
    tree: HuffmanTree,
    options: CodecOptions,
}

impl HuffmanCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodecOptions) -> Self {
        HuffmanCodec {
            tree: HuffmanTree::default(),
            options,
        }
    }

    /// Tree built or imported by the last call.
    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    /// Writes the code table for `source`, then the codeword of every byte.
    ///
    /// The source is read twice: once to count, once to encode after a rewind.
    pub fn encode<R: Read + Seek, W: Write>(&mut self, source: &mut R, sink: &mut W) -> Result<()> {
        self.tree = HuffmanTree::default();

        self.tree = HuffmanTree::from_reader(&mut *source)?;
        trace!("tree:\n{}", self.tree);
        self.tree.export(sink)?;

        source.rewind()?;
        let mut reader = BufReader::new(&mut *source);
        let mut bits_written = 0usize;
        loop {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            for &byte in buf {
                let code = self
                    .tree
                    .code_for(byte)
                    .ok_or(HuffmanError::UnknownSymbol(byte))?;
                sink.write_all(code.as_bytes())?;
                bits_written += code.len();
            }
            let n = buf.len();
            reader.consume(n);
        }
        sink.flush()?;

        debug!(symbols = self.tree.code_table().len(), bits_written, "encoded");
        Ok(())
    }

    /// Reads a code table and payload from `source` and writes the original bytes.
    pub fn decode<R: Read, W: Write>(&mut self, source: &mut R, sink: &mut W) -> Result<()> {
        self.tree = HuffmanTree::default();

        let mut input = Vec::new();
        source.read_to_end(&mut input)?;

        let (tree, consumed) = HuffmanTree::import(&input)?;
        self.tree = tree;

        let decoded = self.decode_payload(&input[consumed..], consumed, sink)?;
        sink.flush()?;

        debug!(symbols = self.tree.code_table().len(), decoded, "decoded");
        Ok(())
    }

    fn decode_payload<W: Write>(&self, payload: &[u8], base_offset: usize, sink: &mut W) -> Result<usize> {
        let table = self.tree.code_table();
        let max_len = table.max_code_len();

        let mut bits = String::with_capacity(max_len);
        let mut out = Vec::with_capacity(OUTPUT_CHUNK);
        let mut decoded = 0usize;

        for (i, &byte) in payload.iter().enumerate() {
            match byte {
                b'0' | b'1' => {
                    bits.push(byte as char);
                    if let Some(symbol) = table.symbol_for(&bits) {
                        out.push(symbol);
                        bits.clear();
                        if out.len() >= OUTPUT_CHUNK {
                            sink.write_all(&out)?;
                            decoded += out.len();
                            out.clear();
                        }
                    } else if bits.len() >= max_len {
                        // No codeword is this long, so nothing can match from here.
                        return Err(HuffmanError::TruncatedPayload { leftover: bits });
                    }
                }
                b if b.is_ascii_whitespace() => {}
                b => {
                    return Err(HuffmanError::InvalidPayload {
                        byte: b,
                        offset: base_offset + i,
                    })
                }
            }
        }

        sink.write_all(&out)?;
        decoded += out.len();

        if !bits.is_empty() {
            match self.options.trailing_bits {
                TrailingBits::Reject => return Err(HuffmanError::TruncatedPayload { leftover: bits }),
                TrailingBits::Discard => warn!(leftover = %bits, "discarding trailing bits"),
            }
        }

        Ok(decoded)
    }

    pub fn encode_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.encode(&mut Cursor::new(data), &mut output)?;
        Ok(output)
    }

    pub fn decode_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decode(&mut Cursor::new(data), &mut output)?;
        Ok(output)
    }

    /// Encodes `input` into `<stem>_encoded.txt` next to it.
    pub fn encode_file(&mut self, input: &Path) -> Result<PathBuf> {
        let output = paths::encoded_path(input);
        self.encode_file_to(input, &output)?;
        Ok(output)
    }

    /// Decodes `input` into `<stem>_decoded.txt` next to it.
    pub fn decode_file(&mut self, input: &Path) -> Result<PathBuf> {
        let output = paths::decoded_path(input);
        self.decode_file_to(input, &output)?;
        Ok(output)
    }

    pub fn encode_file_to(&mut self, input: &Path, output: &Path) -> Result<()> {
        let mut source = BufReader::with_capacity(self.options.buffer_capacity, open(input)?);
        let mut sink = BufWriter::with_capacity(self.options.buffer_capacity, File::create(output)?);

        info!(input = %input.display(), output = %output.display(), "encoding");
        self.encode(&mut source, &mut sink)
    }

    pub fn decode_file_to(&mut self, input: &Path, output: &Path) -> Result<()> {
        let mut source = BufReader::with_capacity(self.options.buffer_capacity, open(input)?);
        let mut sink = BufWriter::with_capacity(self.options.buffer_capacity, File::create(output)?);

        info!(input = %input.display(), output = %output.display(), "decoding");
        self.decode(&mut source, &mut sink)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| HuffmanError::Open {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_aabbbcc_output_layout() {
        let mut codec = HuffmanCodec::new();
        let encoded = codec.encode_bytes(b"aabbbcc").unwrap();

        // c: 00, a: 01, b: 1
        assert_eq!(encoded, b"a01\nb1\nc00\n\n01011110000".to_vec());
        assert_eq!(codec.decode_bytes(&encoded).unwrap(), b"aabbbcc".to_vec());
    }

    #[test]
    fn test_single_symbol_roundtrip() {
        let mut codec = HuffmanCodec::new();
        let encoded = codec.encode_bytes(b"aaaa").unwrap();
        assert_eq!(encoded, b"a1\n\n1111".to_vec());
        assert_eq!(codec.decode_bytes(&encoded).unwrap(), b"aaaa".to_vec());
    }

    #[test]
    fn test_empty_input_writes_only_terminator() {
        let mut codec = HuffmanCodec::new();
        let encoded = codec.encode_bytes(b"").unwrap();
        assert_eq!(encoded, b"\n".to_vec());
        assert!(codec.tree().is_empty());
        assert!(codec.decode_bytes(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_newline_heavy_roundtrip() {
        let mut codec = HuffmanCodec::new();
        for text in [&b"\n"[..], b"\n\n\n", b"a\nb\n", b"line one\nline two\n\n", b"\n0\n1\n"] {
            let encoded = codec.encode_bytes(text).unwrap();
            assert_eq!(codec.decode_bytes(&encoded).unwrap(), text.to_vec());
        }
    }

    #[test]
    fn test_payload_whitespace_is_skipped() {
        let mut codec = HuffmanCodec::new();
        let decoded = codec.decode_bytes(b"a01\nb1\nc00\n\n0101 1110\n000\n").unwrap();
        assert_eq!(decoded, b"aabbbcc".to_vec());
    }

    #[test]
    fn test_line_wrapped_payload() {
        let mut codec = HuffmanCodec::new();
        assert_eq!(codec.decode_bytes(b"a0\nb1\n\n01\n10").unwrap(), b"abba".to_vec());
        assert_eq!(
            codec.decode_bytes(b"a01\nb1\nc00\n\n0101\n1110000\n").unwrap(),
            b"aabbbcc".to_vec()
        );
    }

    /// Serves `first` until rewound, then `second`.
    struct ChangingSource {
        first: Cursor<Vec<u8>>,
        second: Cursor<Vec<u8>>,
        rewound: bool,
    }

    impl Read for ChangingSource {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.rewound {
                self.second.read(buf)
            } else {
                self.first.read(buf)
            }
        }
    }

    impl Seek for ChangingSource {
        fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
            self.rewound = true;
            self.second.seek(pos)
        }
    }

    #[test]
    fn test_source_changed_between_passes() {
        let mut source = ChangingSource {
            first: Cursor::new(b"aab".to_vec()),
            second: Cursor::new(b"abz".to_vec()),
            rewound: false,
        };
        let mut sink = Vec::new();

        let err = HuffmanCodec::new().encode(&mut source, &mut sink).unwrap_err();
        assert!(matches!(err, HuffmanError::UnknownSymbol(b'z')));
    }

    #[test]
    fn test_trailing_bits_rejected_by_default() {
        let mut codec = HuffmanCodec::new();
        let err = codec.decode_bytes(b"a01\nb1\nc00\n\n0110").unwrap_err();
        assert!(matches!(err, HuffmanError::TruncatedPayload { ref leftover } if leftover == "0"));
    }

    #[test]
    fn test_trailing_bits_discarded_when_configured() {
        let options = CodecOptions::default().with_trailing_bits(TrailingBits::Discard);
        let mut codec = HuffmanCodec::with_options(options);
        let decoded = codec.decode_bytes(b"a01\nb1\nc00\n\n0110").unwrap();
        assert_eq!(decoded, b"ab".to_vec());
    }

    #[test]
    fn test_unmatched_bits_fail_early() {
        // Codes {00, 1}: "01" can never complete.
        let mut codec = HuffmanCodec::new();
        let err = codec.decode_bytes(b"x00\ny1\n\n01").unwrap_err();
        assert!(matches!(err, HuffmanError::TruncatedPayload { ref leftover } if leftover == "01"));
    }

    #[test]
    fn test_bits_without_table_fail() {
        let mut codec = HuffmanCodec::new();
        assert!(matches!(
            codec.decode_bytes(b"\n1"),
            Err(HuffmanError::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn test_invalid_payload_byte() {
        let mut codec = HuffmanCodec::new();
        let err = codec.decode_bytes(b"a0\nb1\n\n01x1").unwrap_err();
        assert!(matches!(err, HuffmanError::InvalidPayload { byte: b'x', offset: 9 }));
    }

    #[test]
    fn test_malformed_table_rejects_decode() {
        let mut codec = HuffmanCodec::new();
        let err = codec.decode_bytes(b"a0\nb00\n\n000").unwrap_err();
        assert!(err.is_format_error());
        assert!(codec.tree().is_empty());
    }

    #[test]
    fn test_each_call_rebuilds_tree() {
        let mut codec = HuffmanCodec::new();
        codec.encode_bytes(b"abc").unwrap();
        assert_eq!(codec.tree().code_table().len(), 3);

        codec.encode_bytes(b"zz").unwrap();
        assert_eq!(codec.tree().code_table().len(), 1);
        assert_eq!(codec.tree().code_for(b'a'), None);
    }

    #[test]
    fn test_missing_source_file() {
        let mut codec = HuffmanCodec::new();
        let err = codec.encode_file(Path::new("does/not/exist.txt")).unwrap_err();
        assert!(matches!(err, HuffmanError::Open { .. }));
    }
}
