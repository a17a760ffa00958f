use log::{debug, error, info};
use thiserror::Error;

use super::chunk::{write_chunk, ChunkError, ChunkType};
use super::format::Image;
use crate::compression::{compress, CompressionError};
use crate::config::EncodeOptions;
use crate::constants::{BIT_DEPTH, COLOR_TYPE_INDEXED, IHDR_LENGTH, PNG_SIGNATURE};

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Failed to compress image data")]
    CompressionFailed(#[from] CompressionError),
    #[error("Failed to write chunk")]
    ChunkFailed(#[from] ChunkError),
    #[error("Invalid compression level {0}, expected 0-9")]
    InvalidCompressionLevel(u32),
}

fn header_payload(width: u32, height: u32) -> [u8; IHDR_LENGTH] {
    let mut ihdr = [0u8; IHDR_LENGTH];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = BIT_DEPTH;
    ihdr[9] = COLOR_TYPE_INDEXED;
    // compression, filter and interlace methods stay 0
    ihdr
}

/// Writes `image` as an indexed PNG with default options (no filtering).
pub fn encode(image: &Image) -> Result<Vec<u8>, EncodingError> {
    encode_with(image, &EncodeOptions::default())
}

pub fn encode_with(image: &Image, options: &EncodeOptions) -> Result<Vec<u8>, EncodingError> {
    info!("Starting encoding");

    if options.compression > EncodeOptions::MAX_COMPRESSION {
        error!("Invalid compression level {}", options.compression);
        return Err(EncodingError::InvalidCompressionLevel(options.compression));
    }

    let mut encoded_data: Vec<u8> = Vec::new();

    // Step 1: Signature and header
    encoded_data.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(
        &mut encoded_data,
        ChunkType::IHDR,
        &header_payload(image.width(), image.height()),
    )?;
    debug!("Header written: {}x{}", image.width(), image.height());

    // Step 2: Palette, then alpha for every entry
    let palette = image.palette();
    write_chunk(&mut encoded_data, ChunkType::PLTE, &palette.rgb_bytes())?;
    write_chunk(&mut encoded_data, ChunkType::TRNS, &palette.alpha_bytes())?;
    debug!("Palette data written with {} colors", palette.max_colors());

    // Step 3: Filtered, deflated indices
    let compressed_data = compress(
        image.pixels().as_bytes(),
        image.width() as usize,
        image.height() as usize,
        options.filter,
        options.compression,
    )?;
    write_chunk(&mut encoded_data, ChunkType::IDAT, &compressed_data)?;
    debug!("Image data written: {} bytes", compressed_data.len());

    write_chunk(&mut encoded_data, ChunkType::IEND, &[])?;

    info!("Encoding process completed successfully");
    Ok(encoded_data)
}
