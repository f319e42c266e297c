use bitvec::prelude::*;
use log::trace;

use crate::huffman::{BitStream, CodeTable, HuffmanError, Result};

/// Appends the codeword of every input byte to a growing bit stream.
pub struct HuffmanEncoder<'a> {
    codes: &'a CodeTable,
    compressed: BitStream,
}

impl<'a> HuffmanEncoder<'a> {
    pub fn new(codes: &'a CodeTable) -> Self {
        Self {
            codes,
            compressed: BitVec::new(),
        }
    }

    /// Encodes `data` onto the end of the stream. On
    /// [`HuffmanError::UnknownSymbol`] nothing from this call is kept.
    pub fn pack(&mut self, data: &[u8]) -> Result<()> {
        let start = self.compressed.len();

        for &byte in data {
            match self.codes.get(byte) {
                Some(code) => self.compressed.extend_from_bitslice(code),
                None => {
                    self.compressed.truncate(start);
                    return Err(HuffmanError::UnknownSymbol(byte));
                }
            }
        }

        trace!(
            "packed {} bytes into {} bits",
            data.len(),
            self.compressed.len() - start
        );
        Ok(())
    }

    pub fn bit_len(&self) -> usize {
        self.compressed.len()
    }

    pub fn finish(self) -> BitStream {
        self.compressed
    }
}

/// Concatenates the codes of `data` in input order.
pub fn encode(data: &[u8], codes: &CodeTable) -> Result<BitStream> {
    let mut encoder = HuffmanEncoder::new(codes);
    encoder.pack(data)?;
    Ok(encoder.finish())
}
