#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Length, type, payload and CRC of one chunk.
pub fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 12);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
    out
}

pub fn ihdr_payload(width: u32, height: u32, bit_depth: u8, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[bit_depth, color_type, 0, 0, 0]);
    data
}

pub fn ihdr(width: u32, height: u32) -> Vec<u8> {
    chunk(b"IHDR", &ihdr_payload(width, height, 8, 3))
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn idat(scanlines: &[u8]) -> Vec<u8> {
    chunk(b"IDAT", &zlib(scanlines))
}

pub fn iend() -> Vec<u8> {
    chunk(b"IEND", &[])
}

/// Signature followed by the given chunks, in order.
pub fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = SIGNATURE.to_vec();
    for c in chunks {
        out.extend_from_slice(c);
    }
    out
}

/// Two-color 2x2 image, unfiltered: indices [0, 1, 1, 0].
pub fn checkerboard() -> Vec<u8> {
    png(&[
        ihdr(2, 2),
        chunk(b"PLTE", &[255, 0, 0, 0, 0, 255]),
        idat(&[0, 0, 1, 0, 1, 0]),
        iend(),
    ])
}

/// `width * height` RGBA pixels with a distinct color per pixel
/// (as long as there are at most 65536 pixels).
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for i in 0..width * height {
        rgba.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 128, 255]);
    }
    rgba
}
