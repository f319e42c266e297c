use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bitvec::prelude::*;
use log::{debug, trace};

use crate::huffman::{
    CodeTable, FrequencyTable, HuffmanError, HuffmanTree, Node, NodeId, Result,
};

// Ids are allocated in creation order, so they break weight ties oldest first.
type QueueEntry = Reverse<(u64, NodeId)>;

/// Builds the Huffman tree for `frequencies`.
///
/// The first node popped in each merge becomes the left (`0`) child. A table
/// with a single distinct symbol yields a lone leaf root; see
/// [`build_code_table`] for how that leaf is given a code.
pub fn build_tree(frequencies: &FrequencyTable) -> Result<HuffmanTree> {
    let symbol_count = frequencies.distinct_symbols();
    if symbol_count == 0 {
        return Err(HuffmanError::EmptyInput);
    }

    let mut nodes = Vec::with_capacity(2 * symbol_count - 1);
    let mut queue: BinaryHeap<QueueEntry> = BinaryHeap::with_capacity(symbol_count);

    for (symbol, count) in frequencies.iter() {
        let id = NodeId::new(nodes.len());
        nodes.push(Node::Leaf { symbol });
        queue.push(Reverse((count, id)));
    }

    loop {
        let Reverse((weight, first)) = queue.pop().ok_or(HuffmanError::EmptyInput)?;

        let Some(Reverse((second_weight, second))) = queue.pop() else {
            debug!(
                "built huffman tree: {} symbols, {} nodes, root weight {}",
                symbol_count,
                nodes.len(),
                weight
            );
            return Ok(HuffmanTree::from_nodes(nodes, first));
        };

        let id = NodeId::new(nodes.len());
        trace!(
            "merge {:?} ({}) + {:?} ({}) -> {:?}",
            first,
            weight,
            second,
            second_weight,
            id
        );
        nodes.push(Node::Internal {
            left: first,
            right: second,
        });
        queue.push(Reverse((weight.saturating_add(second_weight), id)));
    }
}

/// Assigns each leaf the bits on its root-to-leaf path (left = 0, right = 1).
///
/// A root that is itself a leaf gets the one-bit code `0`, as if it were the
/// left child of an implicit root.
///
/// Walks the tree with an explicit stack and a single shared path buffer;
/// fails with [`HuffmanError::InvalidTree`] on dangling ids, on a symbol held
/// by more than one leaf, or on a path longer than the arena (a cycle).
pub fn build_code_table(tree: &HuffmanTree) -> Result<CodeTable> {
    let root = tree.root();
    let mut codes = CodeTable::default();

    if let Node::Leaf { symbol } = node_at(tree, root)? {
        codes.insert(*symbol, bitvec![u8, Msb0; 0]);
        return Ok(codes);
    }

    let mut path = BitVec::<u8, Msb0>::new();
    let mut stack: Vec<(NodeId, usize, Option<bool>)> = vec![(root, 0, None)];

    while let Some((id, depth, bit)) = stack.pop() {
        path.truncate(depth);
        if let Some(bit) = bit {
            path.push(bit);
        }
        if path.len() > tree.len() {
            return Err(HuffmanError::InvalidTree { node: id.index() });
        }

        match node_at(tree, id)? {
            Node::Leaf { symbol } => {
                if codes.insert(*symbol, path.clone()).is_some() {
                    return Err(HuffmanError::InvalidTree { node: id.index() });
                }
            }
            Node::Internal { left, right } => {
                // right first so the left subtree is visited first
                stack.push((*right, path.len(), Some(true)));
                stack.push((*left, path.len(), Some(false)));
            }
        }
    }

    debug!(
        "code table: {} codes, longest {} bits",
        codes.len(),
        codes.max_code_length()
    );
    Ok(codes)
}

fn node_at(tree: &HuffmanTree, id: NodeId) -> Result<&Node> {
    tree.node(id)
        .ok_or(HuffmanError::InvalidTree { node: id.index() })
}
