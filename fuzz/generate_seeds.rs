#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn header(channels: u16, height: u32, width: u32, depth: u16, mode: u16) -> Vec<u8> {
    let mut out = b"8BPS".to_vec();
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&[0; 6]);
    out.extend_from_slice(&channels.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&depth.to_be_bytes());
    out.extend_from_slice(&mode.to_be_bytes());
    // color mode data, image resources, layer and mask info
    out.extend_from_slice(&[0; 12]);
    out
}

fn main() {
    use std::fs;
    for dir in ["fuzz/corpus/fuzz_decode", "fuzz/corpus/fuzz_chunked"] {
        fs::create_dir_all(dir).unwrap();
    }
    let dir = "fuzz/corpus/fuzz_decode";

    // RGB 2x1 raw
    let mut rgb = header(3, 1, 2, 8, 3);
    rgb.extend_from_slice(&0u16.to_be_bytes());
    rgb.extend_from_slice(&[255, 0, 0, 255, 0, 0]);
    fs::write(format!("{dir}/rgb_2x1_raw.psd"), &rgb).unwrap();

    // Grayscale 4x2 RLE
    let mut gray = header(1, 2, 4, 8, 1);
    gray.extend_from_slice(&1u16.to_be_bytes());
    gray.extend_from_slice(&2u16.to_be_bytes());
    gray.extend_from_slice(&5u16.to_be_bytes());
    gray.extend_from_slice(&[0xFD, 0x80]);
    gray.extend_from_slice(&[0x03, 1, 2, 3, 4]);
    fs::write(format!("{dir}/gray_4x2_rle.psd"), &gray).unwrap();

    // CMYK 1x1 16-bit raw
    let mut cmyk = header(4, 1, 1, 16, 4);
    cmyk.extend_from_slice(&0u16.to_be_bytes());
    cmyk.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x80, 0x00]);
    fs::write(format!("{dir}/cmyk16_1x1_raw.psd"), &cmyk).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/truncated_header.psd"), &rgb[..20]).unwrap();
    let mut bad_rle = gray.clone();
    let at = bad_rle.len() - 7;
    bad_rle[at] = 0x81;
    fs::write(format!("{dir}/bad_rle.psd"), &bad_rle).unwrap();

    // The chunked target reads its chunk size from the first byte
    for (name, seed) in [("rgb", &rgb), ("gray", &gray), ("cmyk", &cmyk)] {
        let mut chunked = vec![3u8];
        chunked.extend_from_slice(seed);
        fs::write(format!("fuzz/corpus/fuzz_chunked/{name}.psd"), chunked).unwrap();
    }

    println!("Seeds written");
}
