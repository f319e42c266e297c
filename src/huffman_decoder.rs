use bitvec::prelude::*;
use log::trace;

use crate::huffman::{HuffmanError, HuffmanTree, Node, NodeId, Result};

/// Walks a [`HuffmanTree`] bit by bit to recover symbols.
pub struct HuffmanDecoder<'a> {
    tree: &'a HuffmanTree,
}

impl<'a> HuffmanDecoder<'a> {
    pub fn new(tree: &'a HuffmanTree) -> Self {
        Self { tree }
    }

    /// Decodes every complete codeword in `bits`.
    ///
    /// Bits left over after the last complete codeword (a code cut short, or
    /// padding) are dropped without error. A lone-leaf root acts as the left
    /// child of an implicit root, so `0` emits its symbol and `1` has nowhere
    /// to go.
    pub fn unpack(&self, bits: &BitSlice<u8, Msb0>) -> Result<Vec<u8>> {
        let root = self.tree.root();

        if let Node::Leaf { symbol } = self.node(root)? {
            if bits.any() {
                return Err(HuffmanError::InvalidTree { node: root.index() });
            }
            return Ok(vec![symbol; bits.len()]);
        }

        let mut decoded = Vec::with_capacity(bits.len() / 8);
        let mut cursor = root;
        let mut pending = 0usize;

        for bit in bits.iter().by_vals() {
            let Node::Internal { left, right } = self.node(cursor)? else {
                return Err(HuffmanError::InvalidTree {
                    node: cursor.index(),
                });
            };
            let next = if bit { right } else { left };
            pending += 1;

            match self.node(next)? {
                Node::Leaf { symbol } => {
                    decoded.push(symbol);
                    cursor = root;
                    pending = 0;
                }
                Node::Internal { .. } => {
                    if pending > self.tree.len() {
                        return Err(HuffmanError::InvalidTree { node: next.index() });
                    }
                    cursor = next;
                }
            }
        }

        if pending > 0 {
            trace!("dropped {} trailing bits of an incomplete code", pending);
        }
        Ok(decoded)
    }

    fn node(&self, id: NodeId) -> Result<Node> {
        self.tree
            .node(id)
            .copied()
            .ok_or(HuffmanError::InvalidTree { node: id.index() })
    }
}

/// Decodes `bits` against `tree`; see [`HuffmanDecoder::unpack`].
pub fn decode(bits: &BitSlice<u8, Msb0>, tree: &HuffmanTree) -> Result<Vec<u8>> {
    HuffmanDecoder::new(tree).unpack(bits)
}
