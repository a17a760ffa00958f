use std::collections::HashMap;

use log::{debug, error};
use thiserror::Error;

use crate::constants::MAX_PALETTE_COLORS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaletteCompressionError {
    #[error("Invalid pixel data length: expected {expected} bytes, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },
    #[error("Palette overflow: maximum 256 colors supported, attempted to add color #{0}")]
    PaletteOverflow(usize),
}

pub struct PaletteCompression {
    pub palette: Vec<[u8; 4]>, // Distinct colors in first-seen order
    pub indices: Vec<u8>,      // Palette indices for each pixel
}

fn pack(color: [u8; 4]) -> u32 {
    u32::from_be_bytes(color)
}

/// Linear search for the closest palette entry by squared RGBA distance.
/// Ties go to the lowest index.
fn nearest_palette_index(color: [u8; 4], palette: &[[u8; 4]]) -> u8 {
    let mut best_index = 0u8;
    let mut best_distance = u32::MAX;
    for (i, entry) in palette.iter().enumerate() {
        let distance: u32 = color
            .iter()
            .zip(entry)
            .map(|(&a, &b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum();
        if distance < best_distance {
            best_distance = distance;
            best_index = i as u8;
        }
    }
    best_index
}

/// Converts a raw RGBA pixel buffer into a palette and one index per pixel.
///
/// # Parameters
/// - `pixels`: `width * height` pixels in RGBA order.
/// - `quantize`: map colors past the 256th to their nearest palette entry
///   instead of failing.
///
/// # Errors
/// - `BufferLengthMismatch` if `pixels` is not exactly `width * height * 4` bytes
/// - `PaletteOverflow` if a 257th distinct color shows up and `quantize` is off
pub fn palette_compression(
    pixels: &[u8],
    width: u32,
    height: u32,
    quantize: bool,
) -> Result<PaletteCompression, PaletteCompressionError> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        error!(
            "RGBA buffer is {} bytes, expected {} for {}x{}",
            pixels.len(),
            expected,
            width,
            height
        );
        return Err(PaletteCompressionError::BufferLengthMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let mut unique_colors: HashMap<u32, u8> = HashMap::new();
    let mut nearest: HashMap<u32, u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for pixel in pixels.chunks_exact(4) {
        let color = [pixel[0], pixel[1], pixel[2], pixel[3]];
        let key = pack(color);

        if let Some(&index) = unique_colors.get(&key) {
            indices.push(index);
            continue;
        }

        if palette.len() < MAX_PALETTE_COLORS {
            let index = palette.len() as u8;
            palette.push(color);
            unique_colors.insert(key, index);
            indices.push(index);
        } else if quantize {
            // Palette is full from here on; cache each lossy color's search.
            let index = *nearest
                .entry(key)
                .or_insert_with(|| nearest_palette_index(color, &palette));
            indices.push(index);
        } else {
            error!(
                "Palette overflow: color #{} does not fit in {} entries",
                palette.len() + 1,
                MAX_PALETTE_COLORS
            );
            return Err(PaletteCompressionError::PaletteOverflow(palette.len() + 1));
        }
    }

    if !nearest.is_empty() {
        debug!(
            "{} colors mapped to their nearest palette entry",
            nearest.len()
        );
    }

    Ok(PaletteCompression { palette, indices })
}
