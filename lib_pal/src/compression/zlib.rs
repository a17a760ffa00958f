use std::io::{self, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Wraps `data` in a zlib stream at the given level (0-9).
pub fn deflate(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflates a zlib stream, stopping after `limit` output bytes.
pub fn inflate(data: &[u8], limit: usize) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data).take(limit as u64);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// CRC-32 over a chunk's type and payload.
pub fn crc32(chunk_type: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(payload);
    hasher.finalize()
}
