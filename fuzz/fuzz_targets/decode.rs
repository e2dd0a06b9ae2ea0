#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw_data: &[u8]| {
    let mut container = b"LZW1".to_vec();
    container.extend_from_slice(raw_data);
    let _ = lzwpack::decompress(&container);
});
