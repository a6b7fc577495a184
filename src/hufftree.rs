use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};

use tracing::{debug, trace};

use crate::code_table::CodeTable;
use crate::error::{HuffmanError, Result};
use crate::min_heap::{HeapErr, MinHeap};

/// Counts how often each byte occurs in `reader`.
pub fn count_frequencies<R: Read>(reader: R) -> io::Result<BTreeMap<u8, usize>> {
    let mut reader = BufReader::new(reader);
    let mut counts = BTreeMap::new();
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        for &byte in buf {
            *counts.entry(byte).or_insert(0) += 1;
        }
        let n = buf.len();
        reader.consume(n);
    }
    Ok(counts)
}

/// Counts how often each byte occurs in `bytes`.
pub fn frequencies_of(bytes: &[u8]) -> BTreeMap<u8, usize> {
    bytes.iter().copied().fold(BTreeMap::new(), |mut acc, byte| {
        *acc.entry(byte).or_insert(0) += 1;
        acc
    })
}

/// A Huffman tree together with the code table derived from it.
///
/// `root` is `None` when the tree was built from empty input.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTree {
    root: Option<HuffNode>,
    table: CodeTable,
}

impl HuffmanTree {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        HuffmanTree::from_frequencies(&frequencies_of(bytes))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let frequencies = count_frequencies(reader)?;
        HuffmanTree::from_frequencies(&frequencies)
    }

    /// Builds the tree by repeatedly merging the two lightest subtrees.
    pub fn from_frequencies(frequencies: &BTreeMap<u8, usize>) -> Result<Self> {
        if frequencies.is_empty() {
            debug!("no symbols, skipping tree build");
            return Ok(HuffmanTree::default());
        }

        let nodes: Vec<HuffNode> = frequencies
            .iter()
            .map(|(&byte, &count)| HuffNode::new(byte, count))
            .collect();
        debug!(symbols = nodes.len(), "building huffman tree");

        let root = HuffmanTree::build_from_heap(MinHeap::build(nodes))?;

        let mut table = CodeTable::new();
        root.generate_table(&mut table, &mut String::new());
        debug!(
            symbols = table.len(),
            max_code_len = table.max_code_len(),
            "derived code table"
        );

        Ok(HuffmanTree {
            root: Some(root),
            table,
        })
    }

    fn build_from_heap(mut heap: MinHeap<HuffNode>) -> std::result::Result<HuffNode, HeapErr> {
        // A lone symbol still hangs below an internal root so its code is one bit long.
        let first = heap.extract_min()?;
        let second = heap.pop();
        heap.insert(HuffNode::merge(first, second));

        while heap.heap_size() > 1 {
            let right = heap.extract_min()?;
            let left = heap.extract_min()?;
            trace!(right = right.weight(), left = left.weight(), "merge");
            heap.insert(HuffNode::merge(right, Some(left)));
        }

        heap.extract_min()
    }

    /// Rebuilds a tree from a serialized code table at the front of `input`.
    ///
    /// Returns the tree and the number of bytes the table occupied.
    pub fn import(input: &[u8]) -> Result<(Self, usize)> {
        let (table, consumed) = CodeTable::parse(input)?;
        debug!(symbols = table.len(), consumed, "imported code table");

        if table.is_empty() {
            return Ok((HuffmanTree { root: None, table }, consumed));
        }

        let mut root = HuffNode::internal();
        for (index, (symbol, code)) in table.iter().enumerate() {
            root.graft(symbol, code.as_bytes(), index + 1)?;
            trace!(symbol, code, "grafted leaf");
        }

        Ok((HuffmanTree { root: Some(root), table }, consumed))
    }

    /// Writes the code table in its text form, terminator included.
    pub fn export<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.table.write_to(writer)
    }

    pub fn root(&self) -> Option<&HuffNode> {
        self.root.as_ref()
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.table
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn code_for(&self, byte: u8) -> Option<&str> {
        self.table.get(byte)
    }

    /// Follows `bits` from the root and returns the symbol if it ends on a leaf.
    pub fn walk(&self, bits: &str) -> Option<u8> {
        let mut node = self.root.as_ref()?;
        for bit in bits.bytes() {
            node = match node {
                HuffNode::Internal { left, right, .. } => {
                    let child = if bit == b'1' { right } else { left };
                    child.as_deref()?
                }
                HuffNode::Leaf { .. } => return None,
            };
        }
        match node {
            HuffNode::Leaf { byte, .. } => Some(*byte),
            HuffNode::Internal { .. } => None,
        }
    }

    fn fmt_node(f: &mut fmt::Formatter<'_>, node: &HuffNode, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match node {
            HuffNode::Leaf { byte, weight } => {
                writeln!(f, "{}{}-> Leaf: {:?} ({}) [weight: {}]",
                        indent, label, *byte as char, byte, weight)
            },
            HuffNode::Internal { weight, left, right } => {
                writeln!(f, "{}{}-> Internal [weight: {}]", indent, label, weight)?;
                if let Some(left) = left {
                    Self::fmt_node(f, left, depth + 1, "L")?;
                }
                if let Some(right) = right {
                    Self::fmt_node(f, right, depth + 1, "R")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => Self::fmt_node(f, root, 0, "root"),
            None => writeln!(f, "(empty)"),
        }
    }
}

impl From<&str> for HuffmanTree {
    fn from(text: &str) -> Self {
        // Building from in-memory bytes only fails on heap misuse, which cannot happen here.
        HuffmanTree::from_bytes(text.as_bytes()).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum HuffNode {
    Leaf {
        weight: usize,
        byte: u8,
    },
    Internal {
        weight: usize,
        left: Option<Box<HuffNode>>,
        right: Option<Box<HuffNode>>,
    },
}

impl HuffNode {
    pub fn new(b: u8, f: usize) -> Self {
        HuffNode::Leaf {
            weight: f,
            byte: b,
        }
    }

    /// An internal node with no children yet.
    pub fn internal() -> Self {
        HuffNode::Internal {
            weight: 0,
            left: None,
            right: None,
        }
    }

    pub fn weight(&self) -> usize {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// Parents `right` (the lighter node) and an optional `left`.
    pub fn merge(right: Self, left: Option<Self>) -> Self {
        let weight = right.weight() + left.as_ref().map_or(0, HuffNode::weight);
        HuffNode::Internal {
            weight,
            left: left.map(Box::new),
            right: Some(Box::new(right)),
        }
    }

    /// Records the path to every leaf below this node, '0' left and '1' right.
    pub fn generate_table(&self, code_table: &mut CodeTable, prefix: &mut String) {
        match self {
            HuffNode::Leaf { byte, .. } => {
                // A bare leaf root has no path to record.
                if !prefix.is_empty() {
                    code_table.record(*byte, prefix.clone());
                }
            },
            HuffNode::Internal { left, right, .. } => {
                if let Some(left) = left {
                    prefix.push('0');
                    left.generate_table(code_table, prefix);
                    prefix.pop();
                }
                if let Some(right) = right {
                    prefix.push('1');
                    right.generate_table(code_table, prefix);
                    prefix.pop();
                }
            }
        }
    }

    /// Attaches a leaf for `byte` at the end of `codeword`, creating internal
    /// nodes along the way.
    fn graft(&mut self, byte: u8, codeword: &[u8], line: usize) -> Result<()> {
        let collision = || HuffmanError::CodeCollision {
            line,
            codeword: String::from_utf8_lossy(codeword).into_owned(),
        };
        let (&last, path) = codeword.split_last().ok_or(HuffmanError::EmptyCodeword { line, symbol: byte })?;

        let mut current = self;
        for &bit in path {
            current = match current {
                HuffNode::Internal { left, right, .. } => {
                    let slot = if bit == b'1' { right } else { left };
                    &mut **slot.get_or_insert_with(|| Box::new(HuffNode::internal()))
                }
                HuffNode::Leaf { .. } => return Err(collision()),
            };
        }

        match current {
            HuffNode::Internal { left, right, .. } => {
                let slot = if last == b'1' { right } else { left };
                if slot.is_some() {
                    return Err(collision());
                }
                *slot = Some(Box::new(HuffNode::new(byte, 0)));
                Ok(())
            }
            HuffNode::Leaf { .. } => Err(collision()),
        }
    }
}

impl PartialEq for HuffNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HuffNode::Leaf { byte: a, weight: w1 }, HuffNode::Leaf { byte: b, weight: w2 }) => {
                w1 == w2 && a == b
            },
            (HuffNode::Internal { weight: w1, .. }, HuffNode::Internal { weight: w2, .. }) => {
                w1 == w2
            },
            _ => false,
        }
    }
}

impl Eq for HuffNode {}

impl PartialOrd for HuffNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HuffNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.weight().cmp(&other.weight()) {
            std::cmp::Ordering::Equal => {
                // Equal weights: leaves first, leaves by byte value.
                match (self, other) {
                    (HuffNode::Leaf { byte: a, .. }, HuffNode::Leaf { byte: b, .. }) => {
                        a.cmp(b)
                    },
                    (HuffNode::Leaf { .. }, HuffNode::Internal { .. }) => {
                        std::cmp::Ordering::Less
                    },
                    (HuffNode::Internal { .. }, HuffNode::Leaf { .. }) => {
                        std::cmp::Ordering::Greater
                    },
                    (HuffNode::Internal { .. }, HuffNode::Internal { .. }) => {
                        std::cmp::Ordering::Equal
                    },
                }
            },
            other => other,
        }
    }
}
