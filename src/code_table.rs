//! Symbol/codeword mappings and their plain-text form.
//!
//! A table is written one entry per line, the raw symbol byte followed by its
//! codeword as ASCII `'0'`/`'1'`, and closed by an empty line:
//!
//! ```text
//! a01\n
//! b1\n
//! c00\n
//! \n
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use crate::error::{HuffmanError, Result};

/// Longest codeword a 256-symbol Huffman tree can produce.
pub const MAX_CODE_LEN: usize = 255;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, String>,
    reverse: HashMap<String, u8>,
    max_code_len: usize,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codeword for `symbol`.
    pub fn get(&self, symbol: u8) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    /// Symbol whose codeword is exactly `codeword`.
    pub fn symbol_for(&self, codeword: &str) -> Option<u8> {
        self.reverse.get(codeword).copied()
    }

    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code.as_str()))
    }

    /// Adds an entry after checking it keeps the table a prefix-free code.
    ///
    /// Errors report the entry's position as `len() + 1`, which is its line
    /// number when entries are inserted in the order they were read.
    pub fn insert(&mut self, symbol: u8, codeword: &[u8]) -> Result<()> {
        let line = self.len() + 1;

        if codeword.is_empty() {
            return Err(HuffmanError::EmptyCodeword { line, symbol });
        }
        if let Some(&byte) = codeword.iter().find(|&&b| b != b'0' && b != b'1') {
            return Err(HuffmanError::InvalidCodeword { line, byte });
        }
        if codeword.len() > MAX_CODE_LEN {
            return Err(HuffmanError::CodewordTooLong {
                line,
                len: codeword.len(),
            });
        }
        if self.codes.contains_key(&symbol) {
            return Err(HuffmanError::DuplicateSymbol { line, symbol });
        }

        // Only ASCII '0'/'1' remain at this point.
        let codeword: String = codeword.iter().map(|&b| b as char).collect();
        let collides = self
            .codes
            .values()
            .any(|existing| existing.starts_with(&codeword) || codeword.starts_with(existing.as_str()));
        if collides {
            return Err(HuffmanError::CodeCollision { line, codeword });
        }

        self.record(symbol, codeword);
        Ok(())
    }

    /// Adds an entry derived from a tree walk, which is prefix-free already.
    pub(crate) fn record(&mut self, symbol: u8, codeword: String) {
        self.max_code_len = self.max_code_len.max(codeword.len());
        self.reverse.insert(codeword.clone(), symbol);
        self.codes.insert(symbol, codeword);
    }

    /// Checks every pair of codewords. Quadratic; meant for tests and asserts.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&String> = self.codes.values().collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .skip(i + 1)
                .all(|b| !a.starts_with(b.as_str()) && !b.starts_with(a.as_str()))
        })
    }

    /// Writes every entry followed by the empty terminator line.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (&symbol, code) in &self.codes {
            writer.write_all(&[symbol])?;
            writer.write_all(code.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.write_all(b"\n")
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut bytes);
        bytes
    }

    /// Parses a table from the front of `input`.
    ///
    /// Returns the table and the number of bytes consumed, terminator included.
    pub fn parse(input: &[u8]) -> Result<(CodeTable, usize)> {
        let mut table = CodeTable::new();
        let mut entries = TableEntries::new(input);
        for entry in entries.by_ref() {
            table.insert(entry.symbol, entry.codeword)?;
        }
        Ok((table, entries.consumed()))
    }
}

/// One raw table line, not yet validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableEntry<'a> {
    symbol: u8,
    codeword: &'a [u8],
}

/// Splits the table section of an encoded input into entries.
///
/// Iteration stops at the empty terminator line or at end of input. A line
/// whose symbol is itself `\n` looks like the terminator. It is read as an
/// entry only when a `'0'`/`'1'` run ending in `\n` follows it with more input
/// after that, and the run is prefix-free against every codeword read so far.
/// A payload always starts with a whole codeword, so its first line can never
/// pass that last check, however the payload is wrapped.
struct TableEntries<'a> {
    input: &'a [u8],
    pos: usize,
    seen: Vec<&'a [u8]>,
    seen_newline: bool,
    done: bool,
}

impl<'a> TableEntries<'a> {
    fn new(input: &'a [u8]) -> Self {
        TableEntries {
            input,
            pos: 0,
            seen: Vec::new(),
            seen_newline: false,
            done: false,
        }
    }

    /// Bytes consumed so far; the payload starts here once iteration ends.
    fn consumed(&self) -> usize {
        self.pos
    }

    fn newline_entry(&self) -> Option<&'a [u8]> {
        if self.seen_newline {
            return None;
        }
        let rest = &self.input[self.pos + 1..];
        let run = rest.iter().take_while(|&&b| b == b'0' || b == b'1').count();
        let terminated = rest.get(run) == Some(&b'\n');
        if run == 0 || !terminated || rest.len() <= run + 1 {
            return None;
        }

        let candidate = &rest[..run];
        let collides = self
            .seen
            .iter()
            .any(|code| code.starts_with(candidate) || candidate.starts_with(code));
        if collides {
            None
        } else {
            Some(candidate)
        }
    }
}

impl<'a> Iterator for TableEntries<'a> {
    type Item = TableEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.input.len() {
            self.done = true;
            return None;
        }

        let symbol = self.input[self.pos];
        if symbol == b'\n' {
            return match self.newline_entry() {
                Some(codeword) => {
                    self.seen_newline = true;
                    self.seen.push(codeword);
                    self.pos += codeword.len() + 2;
                    Some(TableEntry { symbol, codeword })
                }
                None => {
                    self.pos += 1;
                    self.done = true;
                    None
                }
            };
        }

        let start = self.pos + 1;
        let end = self.input[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.input.len(), |i| start + i);
        self.pos = (end + 1).min(self.input.len());

        let codeword = &self.input[start..end];
        self.seen.push(codeword);
        Some(TableEntry { symbol, codeword })
    }
}
