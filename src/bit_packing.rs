use bitvec::prelude::*;

use crate::huffman::BitStream;

/// Packs MSB-first, zero-padding the last byte on the right.
pub fn pack(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            let byte = chunk.load_be::<u8>();
            // load_be right-aligns a short chunk
            byte << (8 - chunk.len())
        })
        .collect()
}

/// Always `8 * bytes.len()` bits; padding is indistinguishable from data.
pub fn unpack(bytes: &[u8]) -> BitStream {
    BitVec::from_slice(bytes)
}

/// Number of zero bits `pack` appends to a run of `bit_len` bits.
pub fn padding_bits(bit_len: usize) -> usize {
    (8 - bit_len % 8) % 8
}

/// Size in bytes of the packed form of `bit_len` bits.
pub fn packed_len(bit_len: usize) -> usize {
    bit_len.div_ceil(8)
}
