pub mod filter;
pub mod palette;
pub mod zlib;

use filter::{FilterError, FilterStrategy};
use log::{debug, error, info};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Deflate failed: {0}")]
    DeflateFailed(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DecompressionError {
    #[error("Inflate failed: {0}")]
    InflateFailed(#[source] std::io::Error),
    #[error("Scanline reconstruction failed: {0}")]
    UnfilterFailed(#[from] FilterError),
}

/// Filters `width * height` index bytes into scanlines and deflates them into
/// an `IDAT` stream.
pub fn compress(
    indices: &[u8],
    width: usize,
    height: usize,
    strategy: FilterStrategy,
    level: u32,
) -> Result<Vec<u8>, CompressionError> {
    info!("Starting compression");

    // Step 1: Filter each row
    let filtered = filter::filter_scanlines(indices, width, height, strategy);
    debug!(
        "Filtered {} rows with {:?}: {} bytes",
        height,
        strategy,
        filtered.len()
    );

    // Step 2: Deflate
    let deflated = zlib::deflate(&filtered, level).map_err(|e| {
        error!("Deflate failed: {}", e);
        CompressionError::DeflateFailed(e)
    })?;
    debug!("Deflate at level {}: {} bytes", level, deflated.len());

    info!(
        "Compression completed successfully: {}%",
        ((filtered.len() as f32 - deflated.len() as f32) / filtered.len() as f32) * 100.0
    );

    Ok(deflated)
}

/// Inflates a concatenated `IDAT` stream and reconstructs `width * height`
/// index bytes from its scanlines.
pub fn decompress(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, DecompressionError> {
    info!("Starting decompression");
    debug!("Input data length: {}", data.len());

    // Step 1: Inflate, capped one byte past the expected scanlines
    let expected = (width + 1) * height;
    let inflated = zlib::inflate(data, expected + 1).map_err(|e| {
        error!("Inflate failed: {}", e);
        DecompressionError::InflateFailed(e)
    })?;
    debug!("Inflated: {} bytes", inflated.len());

    // Step 2: Undo the scanline filters
    let indices = filter::unfilter_scanlines(&inflated, width, height)?;
    debug!("Reconstructed {} indices", indices.len());

    info!("Decompression completed successfully");

    Ok(indices)
}
