use std::fmt;

use log::{debug, error};
use thiserror::Error;

use crate::compression::zlib::crc32;
use crate::constants::MAX_CHUNK_LENGTH;

/// Four-letter PNG chunk name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: ChunkType = ChunkType(*b"IHDR");
    pub const PLTE: ChunkType = ChunkType(*b"PLTE");
    pub const TRNS: ChunkType = ChunkType(*b"tRNS");
    pub const IDAT: ChunkType = ChunkType(*b"IDAT");
    pub const IEND: ChunkType = ChunkType(*b"IEND");

    pub fn is_valid(&self) -> bool {
        self.0.iter().all(u8::is_ascii_alphabetic)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Truncated chunk header at offset {offset}")]
    TruncatedHeader { offset: usize },
    #[error("{chunk} chunk declares {length} bytes but only {available} remain")]
    Truncated {
        chunk: ChunkType,
        length: usize,
        available: usize,
    },
    #[error("{chunk} chunk checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        chunk: ChunkType,
        stored: u32,
        computed: u32,
    },
    #[error("Invalid chunk type {0:?}")]
    InvalidType(ChunkType),
    #[error("{chunk} chunk payload of {length} bytes exceeds the 2^31-1 limit")]
    TooLarge { chunk: ChunkType, length: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub chunk_type: ChunkType,
    pub data: &'a [u8],
}

/// Walks the chunks of a PNG buffer, checking bounds and CRC of each one.
///
/// Stops after the first error, or when the buffer ends exactly on a chunk
/// boundary.
pub struct ChunkReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ChunkReader<'a> {
    /// `offset` is where the first chunk starts, normally right after the signature.
    pub fn new(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, offset }
    }

    fn read_u32(&self, at: usize) -> u32 {
        u32::from_be_bytes([
            self.buffer[at],
            self.buffer[at + 1],
            self.buffer[at + 2],
            self.buffer[at + 3],
        ])
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>, ChunkError> {
        let start = self.offset;
        let remaining = self.buffer.len() - start;
        if remaining < 8 {
            error!("Truncated chunk header at offset {}", start);
            return Err(ChunkError::TruncatedHeader { offset: start });
        }

        let length = self.read_u32(start) as usize;
        let chunk_type = ChunkType([
            self.buffer[start + 4],
            self.buffer[start + 5],
            self.buffer[start + 6],
            self.buffer[start + 7],
        ]);
        if length > MAX_CHUNK_LENGTH {
            error!("{} chunk declares {} bytes", chunk_type, length);
            return Err(ChunkError::TooLarge { chunk: chunk_type, length });
        }

        // Payload plus the trailing CRC must fit in what is left.
        let available = remaining - 8;
        if length + 4 > available {
            error!(
                "{} chunk declares {} bytes but only {} remain",
                chunk_type, length, available
            );
            return Err(ChunkError::Truncated {
                chunk: chunk_type,
                length,
                available,
            });
        }

        let buffer: &'a [u8] = self.buffer;
        let data = &buffer[start + 8..start + 8 + length];
        let stored = self.read_u32(start + 8 + length);
        let computed = crc32(&chunk_type.0, data);
        if stored != computed {
            error!(
                "{} chunk checksum mismatch: stored {:#010x}, computed {:#010x}",
                chunk_type, stored, computed
            );
            return Err(ChunkError::ChecksumMismatch {
                chunk: chunk_type,
                stored,
                computed,
            });
        }

        self.offset = start + 12 + length;
        debug!("Read {} chunk: {} bytes at offset {}", chunk_type, length, start);
        Ok(Chunk { chunk_type, data })
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.buffer.len() {
            return None;
        }

        let result = self.read_chunk();
        if result.is_err() {
            self.offset = self.buffer.len();
        }
        Some(result)
    }
}

/// Appends `[length][type][payload][crc]` to `out`.
pub fn write_chunk(
    out: &mut Vec<u8>,
    chunk_type: ChunkType,
    payload: &[u8],
) -> Result<(), ChunkError> {
    if !chunk_type.is_valid() {
        error!("Invalid chunk type {:?}", chunk_type.0);
        return Err(ChunkError::InvalidType(chunk_type));
    }
    if payload.len() > MAX_CHUNK_LENGTH {
        error!("{} chunk payload of {} bytes is too large", chunk_type, payload.len());
        return Err(ChunkError::TooLarge {
            chunk: chunk_type,
            length: payload.len(),
        });
    }

    out.reserve(payload.len() + 12);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&chunk_type.0);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc32(&chunk_type.0, payload).to_be_bytes());
    debug!("Wrote {} chunk: {} bytes", chunk_type, payload.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_iend() {
        let mut out = Vec::new();
        write_chunk(&mut out, ChunkType::IEND, &[]).unwrap();
        assert_eq!(
            out,
            vec![0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_write_invalid_type() {
        let mut out = Vec::new();
        let result = write_chunk(&mut out, ChunkType(*b"ID4T"), &[1]);
        assert_eq!(result, Err(ChunkError::InvalidType(ChunkType(*b"ID4T"))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_read_written_chunks() {
        let mut out = Vec::new();
        write_chunk(&mut out, ChunkType::PLTE, &[1, 2, 3]).unwrap();
        write_chunk(&mut out, ChunkType::IEND, &[]).unwrap();

        let chunks: Vec<Chunk> = ChunkReader::new(&out, 0)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_type, ChunkType::PLTE);
        assert_eq!(chunks[0].data, &[1, 2, 3]);
        assert_eq!(chunks[1].chunk_type, ChunkType::IEND);
        assert!(chunks[1].data.is_empty());
    }

    #[test]
    fn test_read_checksum_mismatch() {
        let mut out = Vec::new();
        write_chunk(&mut out, ChunkType::PLTE, &[1, 2, 3]).unwrap();
        out[9] ^= 0xFF;

        let mut reader = ChunkReader::new(&out, 0);
        assert!(matches!(
            reader.next(),
            Some(Err(ChunkError::ChecksumMismatch {
                chunk: ChunkType::PLTE,
                ..
            }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_read_truncated_payload() {
        let mut out = Vec::new();
        write_chunk(&mut out, ChunkType::IDAT, &[7; 10]).unwrap();
        out.truncate(out.len() - 6);

        let mut reader = ChunkReader::new(&out, 0);
        assert_eq!(
            reader.next(),
            Some(Err(ChunkError::Truncated {
                chunk: ChunkType::IDAT,
                length: 10,
                available: 8
            }))
        );
    }

    #[test]
    fn test_read_truncated_header() {
        let out = [0, 0, 0, 1, b'I'];
        let mut reader = ChunkReader::new(&out, 0);
        assert_eq!(
            reader.next(),
            Some(Err(ChunkError::TruncatedHeader { offset: 0 }))
        );
    }

    #[test]
    fn test_read_length_over_limit() {
        let out = [0x80, 0, 0, 0, b'I', b'D', b'A', b'T', 0, 0, 0, 0];
        let mut reader = ChunkReader::new(&out, 0);
        assert_eq!(
            reader.next(),
            Some(Err(ChunkError::TooLarge {
                chunk: ChunkType::IDAT,
                length: 0x8000_0000
            }))
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_chunk_type_display() {
        assert_eq!(ChunkType::TRNS.to_string(), "tRNS");
    }
}
