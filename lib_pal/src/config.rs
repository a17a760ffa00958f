use serde::{Deserialize, Serialize};

use crate::compression::filter::{FilterStrategy, FilterType};

/// Options for writing an [`Image`](crate::Image) to PNG bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// zlib level, 0 (store) to 9 (smallest).
    pub compression: u32,
    pub filter: FilterStrategy,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: 6,
            filter: FilterStrategy::None,
        }
    }
}

impl EncodeOptions {
    pub const MAX_COMPRESSION: u32 = 9;

    pub fn fast() -> Self {
        Self {
            compression: 1,
            filter: FilterStrategy::None,
        }
    }

    pub fn best() -> Self {
        Self {
            compression: Self::MAX_COMPRESSION,
            filter: FilterStrategy::Adaptive,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = FilterStrategy::Fixed(filter);
        self
    }
}

/// Options for building an indexed image from RGBA pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizeOptions {
    /// Map colors past the 256th to their nearest palette entry instead of failing.
    pub quantize: bool,
}
