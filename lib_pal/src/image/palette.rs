use log::error;
use thiserror::Error;

use crate::constants::{DEFAULT_COLOR, MAX_PALETTE_COLORS};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Palette capacity must be between 1 and 256, got {0}")]
    InvalidCapacity(usize),
    #[error("Palette index {index} is out of range for {max_colors} colors")]
    IndexOutOfRange { index: usize, max_colors: usize },
    #[error("Cannot assign {len} colors to a palette of {max_colors} colors")]
    TooManyColors { len: usize, max_colors: usize },
    #[error("Raw palette must be {expected} bytes, got {actual}")]
    RawLengthMismatch { expected: usize, actual: usize },
}

/// Fixed-capacity table of RGBA colors.
///
/// The table always holds exactly `max_colors` entries; entries that were
/// never written are opaque black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
}

impl Palette {
    pub fn new(max_colors: usize) -> Result<Self, PaletteError> {
        if max_colors == 0 || max_colors > MAX_PALETTE_COLORS {
            error!("Invalid palette capacity {}", max_colors);
            return Err(PaletteError::InvalidCapacity(max_colors));
        }

        Ok(Self {
            colors: vec![DEFAULT_COLOR; max_colors],
        })
    }

    pub fn max_colors(&self) -> usize {
        self.colors.len()
    }

    pub fn color(&self, index: usize) -> Result<[u8; 4], PaletteError> {
        self.colors
            .get(index)
            .copied()
            .ok_or(PaletteError::IndexOutOfRange {
                index,
                max_colors: self.colors.len(),
            })
    }

    pub fn set_color(&mut self, index: usize, color: [u8; 4]) -> Result<(), PaletteError> {
        let max_colors = self.colors.len();
        let slot = self
            .colors
            .get_mut(index)
            .ok_or(PaletteError::IndexOutOfRange { index, max_colors })?;
        *slot = color;
        Ok(())
    }

    /// Overwrites the first `colors.len()` entries, leaving the rest untouched.
    pub fn assign(&mut self, colors: &[[u8; 4]]) -> Result<(), PaletteError> {
        if colors.len() > self.colors.len() {
            error!(
                "Cannot assign {} colors to a palette of {}",
                colors.len(),
                self.colors.len()
            );
            return Err(PaletteError::TooManyColors {
                len: colors.len(),
                max_colors: self.colors.len(),
            });
        }

        self.colors[..colors.len()].copy_from_slice(colors);
        Ok(())
    }

    /// Replaces every entry from a flat `r, g, b, a` byte sequence.
    pub fn replace_raw(&mut self, bytes: &[u8]) -> Result<(), PaletteError> {
        let expected = self.colors.len() * 4;
        if bytes.len() != expected {
            error!("Raw palette length {} != {}", bytes.len(), expected);
            return Err(PaletteError::RawLengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        for (slot, rgba) in self.colors.iter_mut().zip(bytes.chunks_exact(4)) {
            *slot = [rgba[0], rgba[1], rgba[2], rgba[3]];
        }
        Ok(())
    }

    pub fn as_raw(&self) -> Vec<u8> {
        self.colors.iter().flatten().copied().collect()
    }

    /// `PLTE` payload: three bytes per entry.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.colors
            .iter()
            .flat_map(|&[r, g, b, _]| [r, g, b])
            .collect()
    }

    /// `tRNS` payload: one alpha byte per entry.
    pub fn alpha_bytes(&self) -> Vec<u8> {
        self.colors.iter().map(|color| color[3]).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8; 4]> {
        self.colors.iter()
    }
}
