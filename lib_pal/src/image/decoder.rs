use super::chunk::{ChunkError, ChunkReader, ChunkType};
use super::format::{validate_dimensions, Image, ImageError};
use super::palette::{Palette, PaletteError};
use crate::compression::{decompress, DecompressionError};
use crate::constants::{
    BIT_DEPTH, COLOR_TYPE_INDEXED, IHDR_LENGTH, MAX_PALETTE_COLORS, PNG_SIGNATURE,
};
use log::{debug, error, info};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid PNG signature")]
    InvalidSignature,
    #[error("Malformed chunk: {0}")]
    ChunkFailed(#[from] ChunkError),
    #[error("{chunk} chunk has invalid length {length}")]
    InvalidChunkLength { chunk: ChunkType, length: usize },
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Image {width}x{height} is too large to decode")]
    ImageTooLarge { width: u32, height: u32 },
    #[error("Unsupported bit depth {0}, only 8 is supported")]
    UnsupportedBitDepth(u8),
    #[error("Unsupported color type {0}, only indexed (3) is supported")]
    UnsupportedColorType(u8),
    #[error("Unsupported compression method {0}")]
    UnsupportedCompressionMethod(u8),
    #[error("Unsupported filter method {0}")]
    UnsupportedFilterMethod(u8),
    #[error("Unsupported interlace method {0}")]
    UnsupportedInterlaceMethod(u8),
    #[error("tRNS chunk appears before PLTE")]
    TransparencyBeforePalette,
    #[error("Missing required {0} chunk")]
    MissingChunk(ChunkType),

    #[error("Decompression failed")]
    DecompressionFailed(#[from] DecompressionError),
    #[error("Decoded image is invalid")]
    InvalidImage(#[from] ImageError),
}

impl From<PaletteError> for DecodeError {
    fn from(err: PaletteError) -> Self {
        DecodeError::InvalidImage(ImageError::Palette(err))
    }
}

#[derive(Debug, Clone, Copy)]
struct Header {
    width: u32,
    height: u32,
}

fn parse_header(data: &[u8]) -> Result<Header, DecodeError> {
    if data.len() != IHDR_LENGTH {
        error!("IHDR chunk has invalid length {}", data.len());
        return Err(DecodeError::InvalidChunkLength {
            chunk: ChunkType::IHDR,
            length: data.len(),
        });
    }

    let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let (bit_depth, color_type) = (data[8], data[9]);
    let (compression, filter, interlace) = (data[10], data[11], data[12]);
    debug!(
        "IHDR: {}x{}, bit depth {}, color type {}, interlace {}",
        width, height, bit_depth, color_type, interlace
    );

    if width == 0 || height == 0 {
        error!("Invalid image dimensions: {}x{}", width, height);
        return Err(DecodeError::InvalidDimensions { width, height });
    }
    if bit_depth != BIT_DEPTH {
        error!("Unsupported bit depth {}", bit_depth);
        return Err(DecodeError::UnsupportedBitDepth(bit_depth));
    }
    if color_type != COLOR_TYPE_INDEXED {
        error!("Unsupported color type {}", color_type);
        return Err(DecodeError::UnsupportedColorType(color_type));
    }
    if compression != 0 {
        error!("Unsupported compression method {}", compression);
        return Err(DecodeError::UnsupportedCompressionMethod(compression));
    }
    if filter != 0 {
        error!("Unsupported filter method {}", filter);
        return Err(DecodeError::UnsupportedFilterMethod(filter));
    }
    if interlace != 0 {
        error!("Unsupported interlace method {}", interlace);
        return Err(DecodeError::UnsupportedInterlaceMethod(interlace));
    }
    if let Err(ImageError::TooLarge { .. }) = validate_dimensions(width, height) {
        return Err(DecodeError::ImageTooLarge { width, height });
    }

    Ok(Header { width, height })
}

/// Expands a `PLTE` payload into a full 256-entry table.
fn parse_palette(data: &[u8]) -> Result<Palette, DecodeError> {
    if data.len() % 3 != 0 || data.len() > MAX_PALETTE_COLORS * 3 {
        error!("PLTE chunk has invalid length {}", data.len());
        return Err(DecodeError::InvalidChunkLength {
            chunk: ChunkType::PLTE,
            length: data.len(),
        });
    }

    let mut palette = Palette::new(MAX_PALETTE_COLORS)?;
    let colors: Vec<[u8; 4]> = data
        .chunks_exact(3)
        .map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
        .collect();
    palette.assign(&colors)?;
    debug!("PLTE: {} colors", colors.len());

    Ok(palette)
}

fn apply_transparency(palette: &mut Palette, data: &[u8]) -> Result<(), DecodeError> {
    if data.len() > palette.max_colors() {
        error!("tRNS chunk has invalid length {}", data.len());
        return Err(DecodeError::InvalidChunkLength {
            chunk: ChunkType::TRNS,
            length: data.len(),
        });
    }

    for (index, &alpha) in data.iter().enumerate() {
        let [r, g, b, _] = palette.color(index)?;
        palette.set_color(index, [r, g, b, alpha])?;
    }
    debug!("tRNS: {} alpha values", data.len());

    Ok(())
}

/// Parses an 8-bit indexed PNG into an [`Image`] with a 256-entry palette.
pub fn decode(encoded_data: &[u8]) -> Result<Image, DecodeError> {
    info!("Starting decoding");

    if !encoded_data.starts_with(&PNG_SIGNATURE) {
        error!("Invalid format or missing PNG signature");
        return Err(DecodeError::InvalidSignature);
    }
    debug!("Signature validated successfully");

    let mut header = None;
    let mut palette = None;
    let mut idat = Vec::new();

    for chunk in ChunkReader::new(encoded_data, PNG_SIGNATURE.len()) {
        let chunk = chunk?;
        match chunk.chunk_type {
            ChunkType::IHDR => header = Some(parse_header(chunk.data)?),
            ChunkType::PLTE => palette = Some(parse_palette(chunk.data)?),
            ChunkType::TRNS => match palette.as_mut() {
                Some(palette) => apply_transparency(palette, chunk.data)?,
                None => {
                    error!("tRNS chunk appears before PLTE");
                    return Err(DecodeError::TransparencyBeforePalette);
                }
            },
            ChunkType::IDAT => idat.extend_from_slice(chunk.data),
            ChunkType::IEND => break,
            other => debug!("Skipping {} chunk", other),
        }
    }

    let header = header.ok_or_else(|| {
        error!("Missing IHDR chunk");
        DecodeError::MissingChunk(ChunkType::IHDR)
    })?;
    let palette = palette.ok_or_else(|| {
        error!("Missing PLTE chunk");
        DecodeError::MissingChunk(ChunkType::PLTE)
    })?;
    debug!("Compressed data length: {}", idat.len());

    let indices = decompress(&idat, header.width as usize, header.height as usize)?;
    let image = Image::from_parts(header.width, header.height, palette, indices)?;
    info!("Decoding completed successfully");

    Ok(image)
}

/// Decodes straight to `width * height * 4` RGBA bytes.
pub fn decode_rgba(encoded_data: &[u8]) -> Result<(u32, u32, Vec<u8>), DecodeError> {
    let image = decode(encoded_data)?;
    Ok((image.width(), image.height(), image.to_rgba()))
}
