#![no_main]
use libfuzzer_sys::fuzz_target;
use pairpack::Decompressor;

fuzz_target!(|data: &[u8]| {
    // arbitrary bytes must decode, error out, or stop short; never panic
    let mut unpacker = Decompressor::new();
    let mut out = [0u8; 64];
    let mut pos = 0;
    loop {
        match unpacker.decompress(&data[pos..], &mut out) {
            Ok(step) => {
                if step.consumed == 0 && step.produced == 0 {
                    break;
                }
                pos += step.consumed;
            }
            Err(_) => break,
        }
    }
});
