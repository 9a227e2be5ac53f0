//! Round-trip a file through the codec and report the ratio.
//!
//! Uses deliberately tiny working buffers to exercise the same suspend and
//! resume paths a microcontroller build would hit.

use pairpack::{Compressor, Decompressor};
use std::env;
use std::fs;
use std::process;

const COMPRESS_BUF: usize = 40;
const DECOMPRESS_BUF: usize = 19;

fn main() {
    let filename = match env::args().nth(1) {
        Some(arg) => arg,
        None => {
            eprintln!("usage: pairpack <filename>");
            process::exit(1);
        }
    };

    let original = match fs::read(&filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("could not read '{}': {}", filename, e);
            process::exit(1);
        }
    };
    println!("File size: {} bytes", original.len());

    let mut packer = Compressor::new();
    let mut compressed = Vec::new();
    {
        let mut working = [0u8; COMPRESS_BUF];
        let mut pos = 0;
        while pos < original.len() {
            let step = packer.compress(&original[pos..], &mut working);
            compressed.extend_from_slice(&working[..step.produced]);
            pos += step.consumed;
        }
    }

    let mut unpacker = Decompressor::new();
    let mut restored = Vec::new();
    {
        let mut working = [0u8; DECOMPRESS_BUF];
        let mut pos = 0;
        while pos < compressed.len() {
            let step = match unpacker.decompress(&compressed[pos..], &mut working) {
                Ok(step) => step,
                Err(e) => {
                    eprintln!("decode failed at byte {}: {}", pos, e);
                    process::exit(1);
                }
            };
            restored.extend_from_slice(&working[..step.produced]);
            pos += step.consumed;
        }
    }

    let (used_slots, total_count) = packer.utilization();
    println!("Table: {}/{} slots in use, summed count {}", used_slots, pairpack::TABLE_SIZE, total_count);

    println!("Input: {} Compressed: {} bytes", original.len(), compressed.len());
    if !original.is_empty() {
        println!("Ratio%: {:.1}", 100.0 * compressed.len() as f64 / original.len() as f64);
    }

    if restored != original {
        let mismatch = original
            .iter()
            .zip(restored.iter())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| original.len().min(restored.len()));
        let line = original[..mismatch].iter().filter(|&&byte| byte == b'\n').count();
        eprintln!("round trip mismatch at byte {} (line {})", mismatch, line);
        process::exit(1);
    }
    println!("Round trip verified.");
}
