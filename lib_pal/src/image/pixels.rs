use log::error;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PixelError {
    #[error("coordinates ({x}, {y}) are out of bounds for a {width}x{height} image")]
    CoordinateOutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("palette index {value} is out of range for {max_colors} colors")]
    PaletteIndexOutOfRange { value: u8, max_colors: usize },
    #[error("index buffer must hold {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Row-major grid of palette indices. Every access is bounds checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    width: u32,
    height: u32,
    max_colors: usize,
    data: Vec<u8>,
}

impl IndexBuffer {
    pub fn new(width: u32, height: u32, max_colors: usize) -> Self {
        Self {
            width,
            height,
            max_colors,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Wraps already reconstructed indices, checking each against `max_colors`.
    pub fn from_indices(
        width: u32,
        height: u32,
        max_colors: usize,
        data: Vec<u8>,
    ) -> Result<Self, PixelError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(PixelError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        if let Some(&value) = data.iter().find(|&&v| v as usize >= max_colors) {
            error!("Index {} exceeds palette of {} colors", value, max_colors);
            return Err(PixelError::PaletteIndexOutOfRange { value, max_colors });
        }

        Ok(Self {
            width,
            height,
            max_colors,
            data,
        })
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize, PixelError> {
        if x >= self.width || y >= self.height {
            return Err(PixelError::CoordinateOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    pub fn index(&self, x: u32, y: u32) -> Result<u8, PixelError> {
        let offset = self.offset(x, y)?;
        Ok(self.data[offset])
    }

    pub fn set_index(&mut self, x: u32, y: u32, value: u8) -> Result<(), PixelError> {
        let offset = self.offset(x, y)?;
        if value as usize >= self.max_colors {
            return Err(PixelError::PaletteIndexOutOfRange {
                value,
                max_colors: self.max_colors,
            });
        }

        self.data[offset] = value;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_buffer_set_get() {
        let mut buffer = IndexBuffer::new(3, 2, 16);
        buffer.set_index(2, 1, 15).unwrap();
        assert_eq!(buffer.index(2, 1).unwrap(), 15);
        assert_eq!(buffer.as_bytes(), &[0, 0, 0, 0, 0, 15]);
    }

    #[test]
    fn test_index_buffer_out_of_bounds() {
        let mut buffer = IndexBuffer::new(3, 2, 16);
        assert_eq!(
            buffer.set_index(3, 0, 1),
            Err(PixelError::CoordinateOutOfRange {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert!(matches!(
            buffer.index(0, 2),
            Err(PixelError::CoordinateOutOfRange { y: 2, .. })
        ));
        assert_eq!(
            buffer.set_index(0, 0, 16),
            Err(PixelError::PaletteIndexOutOfRange {
                value: 16,
                max_colors: 16
            })
        );
        assert!(buffer.as_bytes().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_index_buffer_from_indices() {
        let buffer = IndexBuffer::from_indices(2, 1, 4, vec![3, 1]).unwrap();
        assert_eq!(buffer.index(0, 0).unwrap(), 3);

        assert_eq!(
            IndexBuffer::from_indices(2, 1, 4, vec![4, 1]),
            Err(PixelError::PaletteIndexOutOfRange {
                value: 4,
                max_colors: 4
            })
        );
        assert!(matches!(
            IndexBuffer::from_indices(2, 2, 4, vec![0; 3]),
            Err(PixelError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }
}
