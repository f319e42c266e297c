//! # huffpress
//!
//! Lossless compression of byte streams with a Huffman prefix code.
//!
//! The pipeline is: count byte frequencies, build the Huffman tree, derive a
//! codeword per symbol, concatenate codewords and pack them MSB-first into
//! bytes. Decoding walks the same tree bit by bit.
//!
//! ```
//! let data = b"ABBCCC";
//! let compressed = huffpress::compress(data)?;
//! assert_eq!(huffpress::decompress(&compressed)?, data);
//! # Ok::<(), huffpress::HuffmanError>(())
//! ```
//!
//! [`compress`] writes a small header (frequency table, original length,
//! meaningful bit count, CRC-32C) so that [`decompress`] is an exact inverse
//! and rejects damaged input. The bare
//! packed bits without a header are available through
//! [`HuffmanCodec::compress_raw`]; decoding those needs the codec that
//! produced them.

pub mod bit_packing;
pub mod codec;
pub mod container;
pub mod files;
pub mod huffman;
pub mod huffman_decoder;
pub mod huffman_encoder;
pub mod huffman_tree;

pub use codec::HuffmanCodec;
pub use container::{compress, decompress};
pub use huffman::{
    BitStream, Code, CodeTable, FrequencyTable, HuffmanError, HuffmanTree, Node, NodeId, Result,
    Symbol,
};
pub use huffman_decoder::{decode, HuffmanDecoder};
pub use huffman_encoder::{encode, HuffmanEncoder};
pub use huffman_tree::{build_code_table, build_tree};
