pub mod compression;
pub mod config;
pub mod constants;
pub mod image;

use log::*;
use std::io::Write;

pub use crate::compression::filter::{FilterStrategy, FilterType};
pub use crate::compression::palette::palette_compression as quantize;
pub use crate::config::{EncodeOptions, QuantizeOptions};
pub use crate::image::format::{Image, ImageError};
pub use crate::image::{decode, decode_rgba, encode, encode_with};
pub use crate::image::{decoder::DecodeError, encoder::EncodingError};

/// Installs a stderr logger for this crate. `RUST_LOG` takes precedence over
/// the built-in `lib_pal=debug` filter; calling this more than once is a no-op.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter(Some("lib_pal"), LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}
