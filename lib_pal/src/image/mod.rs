pub mod chunk;
pub mod decoder;
pub mod encoder;
pub mod format;
pub mod palette;
pub mod pixels;

pub use decoder::{decode, decode_rgba};
pub use encoder::{encode, encode_with};
