#![no_main]
use libfuzzer_sys::fuzz_target;
use pairpack::{compress_to_vec, decompress_to_vec};

fuzz_target!(|data: &[u8]| {
    let compressed = compress_to_vec(data);

    // 0xff is reserved as a classification byte; it may only appear as the
    // payload of a run marker (0..=8) or a literal escape (127)
    let mut pos = 0;
    while pos < compressed.len() {
        let byte = compressed[pos];
        assert!(byte != 0xff, "bare 0xff at byte {}", pos);
        pos += if byte <= 8 || byte == 127 { 2 } else { 1 };
    }

    let decompressed =
        decompress_to_vec(&compressed).expect("compressor output must always decode");
    assert!(
        data == decompressed.as_slice(),
        "decompression result did not match the original input"
    );
});
