//! Self-describing compressed file format.
//!
//! The header carries everything the decoder needs to rebuild the exact tree
//! used for encoding and to ignore the padding in the last payload byte, plus
//! a CRC-32C of the original bytes. All integers are big-endian.
//!
//! ```text
//! magic            4   b"HUFP"
//! version          1   1
//! original length  8   u64
//! bit count        8   u64
//! symbol count     2   u16, 1..=256
//! entries          9n  symbol u8 + count u64, ascending symbol
//! checksum         4   u32, CRC-32C of the original bytes
//! payload          ..  packed codewords, ceil(bit count / 8) bytes
//! ```

use std::io::{self, Cursor, Read, Write};
use std::sync::OnceLock;

use bitvec::prelude::*;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::bit_packing;
use crate::codec::HuffmanCodec;
use crate::huffman::{FrequencyTable, HuffmanError, Result};

pub const MAGIC: [u8; 4] = *b"HUFP";
pub const VERSION: u8 = 1;

const FIXED_HEADER_LEN: usize = 4 + 1 + 8 + 8 + 2;
const ENTRY_LEN: usize = 1 + 8;
const CHECKSUM_LEN: usize = 4;

const CRC32C_POLY: u32 = 0x82f6_3b78;

static CRC32C_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub original_length: u64,
    pub bit_count: u64,
    pub frequencies: FrequencyTable,
    pub checksum: u32,
}

impl Header {
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN + ENTRY_LEN * self.frequencies.distinct_symbols() + CHECKSUM_LEN
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u8(VERSION)?;
        writer.write_u64::<BigEndian>(self.original_length)?;
        writer.write_u64::<BigEndian>(self.bit_count)?;
        writer.write_u16::<BigEndian>(self.frequencies.distinct_symbols() as u16)?;
        for (symbol, count) in self.frequencies.iter() {
            writer.write_u8(symbol)?;
            writer.write_u64::<BigEndian>(count)?;
        }
        writer.write_u32::<BigEndian>(self.checksum)?;
        Ok(())
    }

    /// Parses and validates a header, leaving `reader` at the first payload
    /// byte.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(truncated)?;
        if magic != MAGIC {
            return Err(corrupt("not a huffpress file (bad magic)"));
        }

        let version = reader.read_u8().map_err(truncated)?;
        if version != VERSION {
            return Err(corrupt(format!("unsupported version {}", version)));
        }

        let original_length = reader.read_u64::<BigEndian>().map_err(truncated)?;
        let bit_count = reader.read_u64::<BigEndian>().map_err(truncated)?;

        let symbol_count = reader.read_u16::<BigEndian>().map_err(truncated)?;
        if symbol_count == 0 || symbol_count > 256 {
            return Err(corrupt(format!("symbol count {} out of range", symbol_count)));
        }

        let mut entries = Vec::with_capacity(symbol_count as usize);
        let mut previous: Option<u8> = None;
        let mut total = 0u64;
        for _ in 0..symbol_count {
            let symbol = reader.read_u8().map_err(truncated)?;
            let count = reader.read_u64::<BigEndian>().map_err(truncated)?;

            if previous.is_some_and(|previous| symbol <= previous) {
                return Err(corrupt("frequency entries out of order"));
            }
            if count == 0 {
                return Err(corrupt(format!("symbol {:#04x} has a zero count", symbol)));
            }
            total = total
                .checked_add(count)
                .ok_or_else(|| corrupt("frequency counts overflow"))?;

            previous = Some(symbol);
            entries.push((symbol, count));
        }

        if total != original_length {
            return Err(corrupt(format!(
                "frequencies sum to {} but original length is {}",
                total, original_length
            )));
        }

        let checksum = reader.read_u32::<BigEndian>().map_err(truncated)?;

        Ok(Self {
            original_length,
            bit_count,
            frequencies: FrequencyTable::from_counts(entries),
            checksum,
        })
    }
}

/// Compresses `data` into the container format.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let codec = HuffmanCodec::from_data(data)?;
    compress_with(&codec, data)
}

/// Compresses `data` with an already-built codec. The codec's frequency table
/// is what gets stored, so it must be the table of `data` for the output to
/// decompress.
pub fn compress_with(codec: &HuffmanCodec, data: &[u8]) -> Result<Vec<u8>> {
    let bits = codec.encode(data)?;
    let header = Header {
        original_length: data.len() as u64,
        bit_count: bits.len() as u64,
        frequencies: codec.frequencies().clone(),
        checksum: crc32c(data),
    };
    let payload = bit_packing::pack(&bits);

    let mut output = Vec::with_capacity(header.encoded_len() + payload.len());
    header.write_to(&mut output)?;
    output.extend_from_slice(&payload);

    debug!(
        "container: {} byte header, {} bits in {} payload bytes",
        header.encoded_len(),
        header.bit_count,
        payload.len()
    );
    Ok(output)
}

/// Restores the bytes passed to [`compress`].
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(bytes);
    let header = Header::read_from(&mut cursor)?;
    let payload = &bytes[cursor.position() as usize..];

    let bit_count = usize::try_from(header.bit_count)
        .map_err(|_| corrupt("bit count does not fit in memory"))?;
    let expected_len = bit_packing::packed_len(bit_count);
    if payload.len() != expected_len {
        return Err(corrupt(format!(
            "payload is {} bytes, header expects {}",
            payload.len(),
            expected_len
        )));
    }

    let codec = HuffmanCodec::from_frequencies(header.frequencies.clone())?;
    if codec.encoded_bit_len() != header.bit_count {
        return Err(corrupt(format!(
            "bit count {} does not match frequency table ({} bits)",
            header.bit_count,
            codec.encoded_bit_len()
        )));
    }

    let decoded = codec.decode(&payload.view_bits::<Msb0>()[..bit_count])?;
    if decoded.len() as u64 != header.original_length {
        return Err(corrupt(format!(
            "decoded {} bytes, expected {}",
            decoded.len(),
            header.original_length
        )));
    }
    if FrequencyTable::from_bytes(&decoded) != header.frequencies {
        return Err(corrupt("decoded symbols do not match frequency table"));
    }
    let checksum = crc32c(&decoded);
    if checksum != header.checksum {
        return Err(corrupt(format!(
            "checksum {:#010x} does not match header ({:#010x})",
            checksum, header.checksum
        )));
    }

    Ok(decoded)
}

/// CRC-32C (Castagnoli), table driven.
pub fn crc32c(data: &[u8]) -> u32 {
    let table = CRC32C_TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut crc = i as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ CRC32C_POLY } else { crc >> 1 };
            }
            *entry = crc;
        }
        table
    });

    !data.iter().fold(!0u32, |crc, &byte| {
        (crc >> 8) ^ table[usize::from(crc as u8 ^ byte)]
    })
}

fn corrupt(reason: impl Into<String>) -> HuffmanError {
    HuffmanError::CorruptContainer(reason.into())
}

fn truncated(err: io::Error) -> HuffmanError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        corrupt("header is truncated")
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_round_trip() {
        let data = b"ABBCCC";
        let compressed = compress(data).unwrap();

        assert_eq!(&compressed[..4], b"HUFP");
        assert_eq!(
            compressed.len(),
            FIXED_HEADER_LEN + 3 * ENTRY_LEN + CHECKSUM_LEN + 2
        );
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_header_layout() {
        let header = Header {
            original_length: 6,
            bit_count: 9,
            frequencies: FrequencyTable::from_bytes(b"ABBCCC"),
            checksum: crc32c(b"ABBCCC"),
        };
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();

        assert_eq!(bytes.len(), header.encoded_len());
        assert_eq!(bytes[4], VERSION);
        assert_eq!(&bytes[5..13], &6u64.to_be_bytes());
        assert_eq!(&bytes[13..21], &9u64.to_be_bytes());
        assert_eq!(&bytes[21..23], &3u16.to_be_bytes());
        assert_eq!(bytes[23], b'A');
        assert_eq!(&bytes[24..32], &1u64.to_be_bytes());
        assert_eq!(&bytes[50..54], &header.checksum.to_be_bytes());

        let parsed = Header::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_single_symbol_round_trip() {
        let data = vec![b'z'; 1000];
        let compressed = compress(&data).unwrap();

        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_trailing_zero_symbol_survives() {
        // the last symbol's code is all zeros, the case the bare format loses
        let data = b"ABBCCC";
        let codec = HuffmanCodec::from_data(data).unwrap();
        assert_eq!(codec.codes().get(b'C').unwrap().count_ones(), 0);

        let restored = decompress(&compress(data).unwrap()).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(compress(b""), Err(HuffmanError::EmptyInput)));
    }

    #[test]
    fn test_bad_magic() {
        let mut compressed = compress(b"hello").unwrap();
        compressed[0] = b'X';

        assert!(matches!(
            decompress(&compressed),
            Err(HuffmanError::CorruptContainer(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut compressed = compress(b"hello").unwrap();
        compressed[4] = 9;

        let err = decompress(&compressed).unwrap_err();
        assert!(err.to_string().contains("unsupported version 9"));
    }

    #[test]
    fn test_truncated_header() {
        let compressed = compress(b"hello world").unwrap();

        for len in [0, 3, 10, FIXED_HEADER_LEN, FIXED_HEADER_LEN + 4] {
            let err = decompress(&compressed[..len]).unwrap_err();
            assert!(
                matches!(err, HuffmanError::CorruptContainer(_)),
                "length {}: {:?}",
                len,
                err
            );
        }
    }

    #[test]
    fn test_truncated_payload() {
        let compressed = compress(b"hello world").unwrap();
        let err = decompress(&compressed[..compressed.len() - 1]).unwrap_err();

        assert!(err.to_string().contains("payload"));
    }

    #[test]
    fn test_extra_payload_byte() {
        let mut compressed = compress(b"hello world").unwrap();
        compressed.push(0);

        assert!(matches!(
            decompress(&compressed),
            Err(HuffmanError::CorruptContainer(_))
        ));
    }

    #[test]
    fn test_counts_must_match_length() {
        let mut compressed = compress(b"hello").unwrap();
        // bump the original length field
        compressed[12] += 1;

        let err = decompress(&compressed).unwrap_err();
        assert!(err.to_string().contains("frequencies sum to 5"));
    }

    #[test]
    fn test_bit_count_must_match_table() {
        let mut compressed = compress(b"aab").unwrap();
        // 3 bits of payload; claim 2 so the payload length still matches
        compressed[20] = 2;

        let err = decompress(&compressed).unwrap_err();
        assert!(err.to_string().contains("does not match frequency table"));
    }

    #[test]
    fn test_unordered_entries() {
        let mut compressed = compress(b"ab").unwrap();
        // swap the two symbol bytes
        compressed.swap(23, 32);

        assert!(matches!(
            decompress(&compressed),
            Err(HuffmanError::CorruptContainer(_))
        ));
    }

    #[test]
    fn test_crc32c_known_value() {
        assert_eq!(crc32c(b""), 0);
        assert_eq!(crc32c(b"123456789"), 0xe306_9283);
    }

    #[test]
    fn test_payload_bit_flip_is_detected() {
        // every code is two bits, so any flip still decodes to 16 symbols
        let data = b"abcdabcdabcdabcd";
        let compressed = compress(data).unwrap();
        let payload_start = compressed.len() - 4;

        for index in payload_start..compressed.len() {
            for bit in 0..8 {
                let mut damaged = compressed.clone();
                damaged[index] ^= 1 << bit;

                let err = decompress(&damaged).unwrap_err();
                assert!(
                    err.to_string().contains("do not match frequency table"),
                    "byte {} bit {}: {}",
                    index,
                    bit,
                    err
                );
            }
        }
    }

    #[test]
    fn test_reordered_payload_is_detected() {
        // a = 00, b = 01, c = 10, d = 11
        let data = b"abcdabcdabcdabcd";
        let mut compressed = compress(data).unwrap();
        let payload_start = compressed.len() - 4;
        assert_eq!(compressed[payload_start], 0b0001_1011);

        // "abcd" -> "bacd": same symbols, same length
        compressed[payload_start] = 0b0100_1011;
        let err = decompress(&compressed).unwrap_err();
        assert!(err.to_string().contains("checksum"), "{}", err);
    }

    #[test]
    fn test_relabelled_symbol_is_detected() {
        let mut compressed = compress(b"abcdabcd").unwrap();
        // 'd' -> 'e' keeps the entries ascending and the tree shape unchanged
        let d_entry = FIXED_HEADER_LEN + 3 * ENTRY_LEN;
        assert_eq!(compressed[d_entry], b'd');
        compressed[d_entry] = b'e';

        assert!(matches!(
            decompress(&compressed),
            Err(HuffmanError::CorruptContainer(reason)) if reason.contains("checksum")
        ));
    }
}
