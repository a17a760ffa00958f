use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::palette::{Palette, PaletteError};
use super::pixels::{IndexBuffer, PixelError};
use crate::compression::palette::{palette_compression, PaletteCompressionError};
use crate::config::QuantizeOptions;
use crate::constants::MAX_PALETTE_COLORS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Image {width}x{height} is too large to address in memory")]
    TooLarge { width: u32, height: u32 },
    #[error("Palette operation failed: {0}")]
    Palette(#[from] PaletteError),
    #[error("Pixel operation failed: {0}")]
    Pixel(#[from] PixelError),
    #[error("Palette quantization failed: {0}")]
    Quantization(#[from] PaletteCompressionError),
}

/// An 8-bit indexed image: a palette plus one palette index per pixel.
///
/// Deserialization goes through the same checks as [`Image::new`], so a
/// stored image can never hold an index outside its palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RawImage", try_from = "RawImage")]
pub struct Image {
    width: u32,
    height: u32,
    palette: Palette,
    pixels: IndexBuffer,
}

#[derive(Serialize, Deserialize)]
struct RawImage {
    width: u32,
    height: u32,
    colors: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

impl From<Image> for RawImage {
    fn from(image: Image) -> Self {
        Self {
            width: image.width,
            height: image.height,
            colors: image.palette.iter().copied().collect(),
            indices: image.pixels.as_bytes().to_vec(),
        }
    }
}

impl TryFrom<RawImage> for Image {
    type Error = ImageError;

    fn try_from(raw: RawImage) -> Result<Self, Self::Error> {
        let mut palette = Palette::new(raw.colors.len())?;
        palette.assign(&raw.colors)?;
        Image::from_parts(raw.width, raw.height, palette, raw.indices)
    }
}

/// Rejects zero dimensions and sizes whose RGBA expansion would not fit in memory.
pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        error!("Invalid image dimensions: {}x{}", width, height);
        return Err(ImageError::InvalidDimensions { width, height });
    }

    let fits = (width as usize)
        .checked_add(1)
        .and_then(|stride| stride.checked_mul(4))
        .and_then(|bytes| bytes.checked_mul(height as usize))
        .is_some();
    if !fits {
        error!("Image {}x{} is too large", width, height);
        return Err(ImageError::TooLarge { width, height });
    }

    Ok(())
}

impl Image {
    /// Creates an image with a defaulted palette and every pixel set to index 0.
    pub fn new(width: u32, height: u32, max_colors: usize) -> Result<Self, ImageError> {
        validate_dimensions(width, height)?;
        let palette = Palette::new(max_colors)?;

        Ok(Self {
            width,
            height,
            palette,
            pixels: IndexBuffer::new(width, height, max_colors),
        })
    }

    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        palette: Palette,
        indices: Vec<u8>,
    ) -> Result<Self, ImageError> {
        validate_dimensions(width, height)?;
        let pixels = IndexBuffer::from_indices(width, height, palette.max_colors(), indices)?;

        Ok(Self {
            width,
            height,
            palette,
            pixels,
        })
    }

    /// Builds an indexed image from `width * height` RGBA pixels.
    ///
    /// Colors are assigned palette slots in first-seen order. Past 256 distinct
    /// colors this fails, unless `options.quantize` is set, in which case
    /// further colors map to their nearest palette entry.
    pub fn from_rgba(
        width: u32,
        height: u32,
        rgba: &[u8],
        options: &QuantizeOptions,
    ) -> Result<Self, ImageError> {
        validate_dimensions(width, height)?;
        let compressed = palette_compression(rgba, width, height, options.quantize)?;
        debug!(
            "Quantized {}x{} image into {} palette entries",
            width,
            height,
            compressed.palette.len()
        );

        let mut palette = Palette::new(MAX_PALETTE_COLORS)?;
        palette.assign(&compressed.palette)?;
        Self::from_parts(width, height, palette, compressed.indices)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn max_colors(&self) -> usize {
        self.palette.max_colors()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn color(&self, index: usize) -> Result<[u8; 4], ImageError> {
        Ok(self.palette.color(index)?)
    }

    pub fn set_color(&mut self, index: usize, color: [u8; 4]) -> Result<(), ImageError> {
        Ok(self.palette.set_color(index, color)?)
    }

    pub fn assign_palette(&mut self, colors: &[[u8; 4]]) -> Result<(), ImageError> {
        Ok(self.palette.assign(colors)?)
    }

    pub fn replace_palette_raw(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        Ok(self.palette.replace_raw(bytes)?)
    }

    pub fn pixel_index(&self, x: u32, y: u32) -> Result<u8, ImageError> {
        Ok(self.pixels.index(x, y)?)
    }

    pub fn set_pixel_index(&mut self, x: u32, y: u32, value: u8) -> Result<(), ImageError> {
        Ok(self.pixels.set_index(x, y, value)?)
    }

    pub fn pixels(&self) -> &IndexBuffer {
        &self.pixels
    }

    /// Expands every pixel through the palette into `width * height * 4` bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let colors: Vec<[u8; 4]> = self.palette.iter().copied().collect();
        self.pixels
            .as_bytes()
            .iter()
            .flat_map(|&index| colors[index as usize])
            .collect()
    }
}
