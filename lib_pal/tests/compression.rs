mod common;

use common::gradient;
use lib_pal::compression::palette::PaletteCompressionError;
use lib_pal::{decode, encode, quantize, Image, ImageError, QuantizeOptions};

#[test]
fn test_quantize_repeating_color() {
    let rgba = vec![255, 0, 0, 255].repeat(16); // 4x4 red image
    let compressed = quantize(&rgba, 4, 4, false).unwrap();
    assert_eq!(compressed.palette, vec![[255, 0, 0, 255]]);
    assert!(compressed.indices.iter().all(|&i| i == 0));
}

#[test]
fn test_quantize_first_seen_order() {
    let rgba = [
        0, 0, 255, 255, // blue
        255, 0, 0, 255, // red
        0, 0, 255, 255, // blue
        0, 255, 0, 255, // green
    ];
    let compressed = quantize(&rgba, 4, 1, false).unwrap();
    assert_eq!(
        compressed.palette,
        vec![[0, 0, 255, 255], [255, 0, 0, 255], [0, 255, 0, 255]]
    );
    assert_eq!(compressed.indices, vec![0, 1, 0, 2]);
}

#[test]
fn test_from_rgba_overflow_without_quantize() {
    let rgba = gradient(20, 20);
    let result = Image::from_rgba(20, 20, &rgba, &QuantizeOptions::default());
    assert!(matches!(
        result,
        Err(ImageError::Quantization(
            PaletteCompressionError::PaletteOverflow(257)
        ))
    ));
}

#[test]
fn test_from_rgba_overflow_with_quantize() {
    let rgba = gradient(20, 20);
    let options = QuantizeOptions { quantize: true };
    let image = Image::from_rgba(20, 20, &rgba, &options).unwrap();

    assert_eq!(image.max_colors(), 256);
    assert!(image
        .pixels()
        .as_bytes()
        .iter()
        .all(|&i| (i as usize) < image.max_colors()));

    // The first 256 colors keep their exact value
    let expanded = image.to_rgba();
    assert_eq!(&expanded[..256 * 4], &rgba[..256 * 4]);

    // And the quantized image still survives a PNG round trip
    let decoded = decode(&encode(&image).unwrap()).unwrap();
    assert_eq!(decoded.to_rgba(), expanded);
}

#[test]
fn test_from_rgba_length_mismatch() {
    let rgba = vec![0; 15];
    let result = Image::from_rgba(2, 2, &rgba, &QuantizeOptions::default());
    assert!(matches!(
        result,
        Err(ImageError::Quantization(
            PaletteCompressionError::BufferLengthMismatch {
                expected: 16,
                actual: 15
            }
        ))
    ));
}
