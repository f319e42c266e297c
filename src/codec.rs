use bitvec::prelude::*;
use log::debug;

use crate::bit_packing;
use crate::huffman::{BitStream, CodeTable, FrequencyTable, HuffmanTree, Result};
use crate::huffman_decoder::decode;
use crate::huffman_encoder::encode;
use crate::huffman_tree::{build_code_table, build_tree};

/// A frequency table together with the tree and code table derived from it.
///
/// Keeping all three lets the exact code used for encoding be reused for
/// decoding.
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    frequencies: FrequencyTable,
    tree: HuffmanTree,
    codes: CodeTable,
}

impl HuffmanCodec {
    pub fn from_frequencies(frequencies: FrequencyTable) -> Result<Self> {
        let tree = build_tree(&frequencies)?;
        let codes = build_code_table(&tree)?;
        debug!(
            "codec ready: {} symbols over {} bytes",
            codes.len(),
            frequencies.total()
        );

        Ok(Self {
            frequencies,
            tree,
            codes,
        })
    }

    pub fn from_data(data: &[u8]) -> Result<Self> {
        Self::from_frequencies(FrequencyTable::from_bytes(data))
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// Bits needed to encode the input the frequency table describes.
    pub fn encoded_bit_len(&self) -> u64 {
        self.codes.weighted_length(&self.frequencies)
    }

    pub fn encode(&self, data: &[u8]) -> Result<BitStream> {
        encode(data, &self.codes)
    }

    pub fn decode(&self, bits: &BitSlice<u8, Msb0>) -> Result<Vec<u8>> {
        decode(bits, &self.tree)
    }

    /// Packed codewords with no header: the bare on-disk format.
    pub fn compress_raw(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(bit_packing::pack(&self.encode(data)?))
    }

    /// Decodes output of [`compress_raw`](Self::compress_raw).
    ///
    /// The padding of the last byte is indistinguishable from real bits, so
    /// the result can carry extra trailing symbols when the padding happens
    /// to spell out complete codewords.
    pub fn decompress_raw(&self, packed: &[u8]) -> Result<Vec<u8>> {
        self.decode(packed.view_bits::<Msb0>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::HuffmanError;

    #[test]
    fn test_codec_round_trip() {
        let data = b"she sells sea shells by the sea shore";
        let codec = HuffmanCodec::from_data(data).unwrap();

        let bits = codec.encode(data).unwrap();
        assert_eq!(bits.len() as u64, codec.encoded_bit_len());
        assert_eq!(codec.decode(&bits).unwrap(), data);
    }

    #[test]
    fn test_codec_rejects_empty_input() {
        assert!(matches!(
            HuffmanCodec::from_data(b""),
            Err(HuffmanError::EmptyInput)
        ));
    }

    #[test]
    fn test_raw_round_trip_gains_padding_symbols() {
        // C=0, so each of the 7 padding bits decodes as another 'C'
        let codec = HuffmanCodec::from_data(b"ABBCCC").unwrap();
        let packed = codec.compress_raw(b"ABBCCC").unwrap();

        assert_eq!(packed, vec![0b1011_1100, 0b0000_0000]);

        let restored = codec.decompress_raw(&packed).unwrap();
        assert!(restored.starts_with(b"ABBCCC"));
        assert_eq!(restored.len(), 13);
    }

    #[test]
    fn test_raw_round_trip_exact_when_byte_aligned() {
        // 4 symbols of equal weight: every code is 2 bits, 4 symbols = 1 byte
        let data = b"abcd";
        let codec = HuffmanCodec::from_data(data).unwrap();
        let packed = codec.compress_raw(data).unwrap();

        assert_eq!(packed, vec![0b0001_1011]);
        assert_eq!(codec.decompress_raw(&packed).unwrap(), data);
    }

    #[test]
    fn test_raw_padding_spells_a_whole_code() {
        // three 2-bit codes use 6 bits; the 2 padding bits spell 'a' (00)
        let codec = HuffmanCodec::from_data(b"abcd").unwrap();
        let packed = codec.compress_raw(b"dcb").unwrap();

        assert_eq!(packed, vec![0b1110_0100]);
        assert_eq!(codec.decompress_raw(&packed).unwrap(), b"dcba");
    }

    #[test]
    fn test_codec_unknown_symbol() {
        let codec = HuffmanCodec::from_data(b"abc").unwrap();
        assert!(matches!(
            codec.encode(b"abz"),
            Err(HuffmanError::UnknownSymbol(b'z'))
        ));
    }
}
