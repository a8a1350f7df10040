#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn header(image_type: u8, w: u16, h: u16, depth: u8, descriptor: u8) -> Vec<u8> {
    let mut b = vec![0u8; 18];
    b[2] = image_type;
    b[12..14].copy_from_slice(&w.to_le_bytes());
    b[14..16].copy_from_slice(&h.to_le_bytes());
    b[16] = depth;
    b[17] = descriptor;
    b
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // True-color 24-bit 2x2, bottom-left
    let mut tc24 = header(2, 2, 2, 24, 0);
    tc24.extend_from_slice(&[0, 0, 255, 0, 255, 0, 255, 0, 0, 128, 128, 128]);
    fs::write(format!("{dir}/tc24_2x2.tga"), tc24).unwrap();

    // True-color 32-bit 1x1, top-left, 8 alpha bits
    let mut tc32 = header(2, 1, 1, 32, 0x28);
    tc32.extend_from_slice(&[1, 2, 3, 4]);
    fs::write(format!("{dir}/tc32_1x1.tga"), tc32).unwrap();

    // 16-bit true-color RLE 3x1
    let mut tc16 = header(10, 3, 1, 16, 0x01);
    tc16.extend_from_slice(&[0x82, 0x1F, 0x80]);
    fs::write(format!("{dir}/tc16_rle.tga"), tc16).unwrap();

    // Color-mapped 2x1 with a 24-bit palette and first_entry offset
    let mut cm = header(1, 2, 1, 8, 0);
    cm[1] = 1;
    cm[3] = 2; // first entry
    cm[5] = 2; // length
    cm[7] = 24;
    cm.extend_from_slice(&[0, 0, 255, 255, 0, 0, 3, 2]);
    fs::write(format!("{dir}/cm_2x1.tga"), cm).unwrap();

    // Color-mapped RLE 4x1
    let mut cm_rle = header(9, 4, 1, 8, 0);
    cm_rle[1] = 1;
    cm_rle[5] = 1;
    cm_rle[7] = 32;
    cm_rle.extend_from_slice(&[9, 8, 7, 6, 0x83, 0]);
    fs::write(format!("{dir}/cm_rle.tga"), cm_rle).unwrap();

    // Gray 8-bit and 16-bit RLE
    let mut g8 = header(3, 3, 1, 8, 0);
    g8.extend_from_slice(&[0, 128, 255]);
    fs::write(format!("{dir}/gray8.tga"), g8).unwrap();
    let mut g16 = header(11, 2, 2, 16, 0x28);
    g16.extend_from_slice(&[0x83, 50, 200]);
    fs::write(format!("{dir}/gray16_rle.tga"), g16).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/no_image.tga"), header(0, 0, 0, 0, 0)).unwrap();
    fs::write(format!("{dir}/short_header.bin"), &header(2, 1, 1, 24, 0)[..10]).unwrap();
    let mut overrun = header(11, 2, 1, 8, 0);
    overrun.extend_from_slice(&[0xFF, 1]);
    fs::write(format!("{dir}/rle_overrun.tga"), overrun).unwrap();

    println!("Generated seed corpus in {dir}/");
}
