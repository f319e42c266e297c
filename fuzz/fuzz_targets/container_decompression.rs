#![no_main]

use libfuzzer_sys::fuzz_target;
use huffpress::decompress;

fuzz_target!(|data: &[u8]| {
    let _ = decompress(data);
});
