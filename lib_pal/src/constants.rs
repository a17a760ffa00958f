pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest palette an 8-bit indexed image can address.
pub const MAX_PALETTE_COLORS: usize = 256;

/// Palette entries nobody has written to yet are opaque black.
pub const DEFAULT_COLOR: [u8; 4] = [0, 0, 0, 255];

pub const BIT_DEPTH: u8 = 8;
pub const COLOR_TYPE_INDEXED: u8 = 3;
pub const IHDR_LENGTH: usize = 13;

// Chunk payloads are capped at 2^31 - 1 bytes.
pub const MAX_CHUNK_LENGTH: usize = 0x7FFF_FFFF;
