#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw: &[u8]| {
    let (width, data) = match raw.split_first() {
        Some((&w, data)) => (8 + w % 25, data),
        None => return,
    };

    let compressed = lzwpack::compress(data, width).unwrap();
    let result = lzwpack::decompress(&compressed);
    assert!(result.is_ok(), "{:?}", result);
    assert!(result.unwrap() == data);
});
