#![no_main]

use huffpress::{compress, decompress, HuffmanCodec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let codec = HuffmanCodec::from_data(data).unwrap();
    let bits = codec.encode(data).unwrap();
    assert_eq!(data, codec.decode(&bits).unwrap());

    let compressed = compress(data).unwrap();
    assert_eq!(data, decompress(&compressed).unwrap());
});
