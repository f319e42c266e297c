use std::fmt;
use std::path::PathBuf;

use bitvec::prelude::*;
use itertools::Itertools;
use thiserror::Error;

/// One byte value being encoded.
pub type Symbol = u8;

/// A single codeword, most significant (first emitted) bit first.
pub type Code = BitVec<u8, Msb0>;

/// An ordered run of logical bits. Stored MSB-first so that the backing
/// bytes are already in packed order.
pub type BitStream = BitVec<u8, Msb0>;

type SymbolCounts = [u64; 256];
type SymbolCodes = [Option<Code>; 256];

pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("read failed: {} does not exist", path.display())]
    FileNotFound { path: PathBuf },

    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("tree construction failed: input has no symbols")]
    EmptyInput,

    #[error("encoding failed: byte {0:#04x} has no code")]
    UnknownSymbol(Symbol),

    #[error("decoding failed: tree is malformed at node {node}")]
    InvalidTree { node: usize },

    #[error("corrupt container: {0}")]
    CorruptContainer(String),
}

/// Occurrence count for every byte value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FrequencyTable {
    counts: SymbolCounts,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl FrequencyTable {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Builds a table from explicit `(symbol, count)` pairs. Repeated symbols
    /// accumulate; zero counts leave the symbol absent.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, u64)>,
    {
        counts
            .into_iter()
            .fold(Self::default(), |mut table, (symbol, count)| {
                let slot = &mut table.counts[symbol as usize];
                *slot = slot.saturating_add(count);
                table
            })
    }

    pub fn count(&self, symbol: Symbol) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts, i.e. the length of the input the table was built from.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, &count| acc.saturating_add(count))
    }

    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    /// Non-zero entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, count)| (symbol as Symbol, *count))
    }
}

impl From<&[u8]> for FrequencyTable {
    fn from(data: &[u8]) -> Self {
        Self::from_bytes(data)
    }
}

impl fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Index of a node inside a [`HuffmanTree`] arena.
///
/// Ids are handed out in creation order, which the tree builder relies on to
/// break frequency ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: Symbol },
    Internal { left: NodeId, right: NodeId },
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A strict binary prefix-code tree stored as a flat arena.
///
/// Left edges are `0` bits, right edges are `1` bits. Node frequencies are a
/// construction detail and are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// Wraps an arena built elsewhere. The structure is not checked here;
    /// dangling ids surface as [`HuffmanError::InvalidTree`] when the tree is
    /// traversed.
    pub fn from_nodes(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Symbols held by the leaves, in arena order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Leaf { symbol } => Some(*symbol),
            Node::Internal { .. } => None,
        })
    }
}

/// Codeword for every symbol that has one.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: SymbolCodes,
}

impl Default for CodeTable {
    fn default() -> Self {
        Self {
            codes: std::array::from_fn(|_| None),
        }
    }
}

impl CodeTable {
    /// Stores `code` for `symbol`, handing back any code it replaced.
    pub(crate) fn insert(&mut self, symbol: Symbol, code: Code) -> Option<Code> {
        self.codes[symbol as usize].replace(code)
    }

    pub fn get(&self, symbol: Symbol) -> Option<&BitSlice<u8, Msb0>> {
        self.codes[symbol as usize].as_deref()
    }

    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Option::is_none)
    }

    /// `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &BitSlice<u8, Msb0>)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_deref().map(|code| (symbol as Symbol, code)))
    }

    pub fn max_code_length(&self) -> usize {
        self.iter().map(|(_, code)| code.len()).max().unwrap_or(0)
    }

    /// Σ count(s) × len(code(s)): the encoded size in bits of the input
    /// `frequencies` was measured on.
    pub fn weighted_length(&self, frequencies: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(symbol, code)| frequencies.count(symbol).saturating_mul(code.len() as u64))
            .fold(0u64, u64::saturating_add)
    }

    /// True when no codeword is a prefix of another.
    ///
    /// After a lexicographic sort every code that extends a prefix sits
    /// directly behind it, so adjacent pairs are enough.
    pub fn is_prefix_free(&self) -> bool {
        self.iter()
            .map(|(_, code)| code)
            .sorted()
            .tuple_windows()
            .all(|(shorter, longer)| !longer.starts_with(shorter))
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .iter()
            .map(|(symbol, code)| format!("{}: {}", symbol_label(symbol), bit_string(code)))
            .join("\n");
        f.write_str(&lines)
    }
}

impl fmt::Debug for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(symbol, code)| (symbol, bit_string(code))))
            .finish()
    }
}

/// Renders bits as a string of `0`/`1` characters.
pub fn bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter().by_vals().map(|bit| if bit { '1' } else { '0' }).collect()
}

fn symbol_label(symbol: Symbol) -> String {
    if symbol.is_ascii_graphic() {
        format!("'{}'", symbol as char)
    } else {
        format!("{:#04x}", symbol)
    }
}
