use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Scanline data too short: expected {expected} bytes, got {actual}")]
    TruncatedScanlineData { expected: usize, actual: usize },
    #[error("Unknown filter type {tag} on row {row}")]
    UnknownFilterType { row: usize, tag: u8 },
}

/// Per-row PNG filter, stored as the first byte of each scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];
}

impl TryFrom<u8> for FilterType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(FilterType::None),
            1 => Ok(FilterType::Sub),
            2 => Ok(FilterType::Up),
            3 => Ok(FilterType::Average),
            4 => Ok(FilterType::Paeth),
            other => Err(other),
        }
    }
}

/// How the encoder picks a filter for each row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStrategy {
    /// Every row unfiltered.
    #[default]
    None,
    /// Same filter on every row.
    Fixed(FilterType),
    /// Per row, the filter whose residuals have the smallest absolute sum.
    Adaptive,
}

/// Selects whichever of `left`, `above` or `upper_left` is closest to
/// `left + above - upper_left`, preferring them in that order on ties.
pub fn paeth_predictor(left: u8, above: u8, upper_left: u8) -> u8 {
    let a = left as i16;
    let b = above as i16;
    let c = upper_left as i16;

    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}

fn predict(filter: FilterType, left: u8, above: u8, upper_left: u8) -> u8 {
    match filter {
        FilterType::None => 0,
        FilterType::Sub => left,
        FilterType::Up => above,
        FilterType::Average => ((left as u16 + above as u16) / 2) as u8,
        FilterType::Paeth => paeth_predictor(left, above, upper_left),
    }
}

/// Reverses the filter of one row in place. `prev` is the reconstructed row
/// above, or `None` for the first row.
fn unfilter_row(filter: FilterType, row: &mut [u8], prev: Option<&[u8]>) {
    for x in 0..row.len() {
        let left = if x > 0 { row[x - 1] } else { 0 };
        let above = prev.map_or(0, |p| p[x]);
        let upper_left = match prev {
            Some(p) if x > 0 => p[x - 1],
            _ => 0,
        };
        row[x] = row[x].wrapping_add(predict(filter, left, above, upper_left));
    }
}

/// Applies `filter` to one row of raw bytes, appending the residuals to `out`.
fn filter_row(filter: FilterType, row: &[u8], prev: Option<&[u8]>, out: &mut Vec<u8>) {
    for (x, &byte) in row.iter().enumerate() {
        let left = if x > 0 { row[x - 1] } else { 0 };
        let above = prev.map_or(0, |p| p[x]);
        let upper_left = match prev {
            Some(p) if x > 0 => p[x - 1],
            _ => 0,
        };
        out.push(byte.wrapping_sub(predict(filter, left, above, upper_left)));
    }
}

/// Lower is usually more compressible.
fn score(residuals: &[u8]) -> u64 {
    residuals
        .iter()
        .map(|&b| (b as i8).unsigned_abs() as u64)
        .sum()
}

/// Reconstructs `height` rows of `width` index bytes from filtered scanlines.
///
/// Each scanline is one filter tag followed by `width` bytes. Bytes past the
/// last scanline are ignored.
pub fn unfilter_scanlines(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, FilterError> {
    let stride = width + 1;
    let expected = stride * height;
    if data.len() < expected {
        error!(
            "Scanline data too short: expected {} bytes, got {}",
            expected,
            data.len()
        );
        return Err(FilterError::TruncatedScanlineData {
            expected,
            actual: data.len(),
        });
    }

    let mut pixels = vec![0u8; width * height];
    for (y, scanline) in data[..expected].chunks_exact(stride).enumerate() {
        let tag = scanline[0];
        let filter = FilterType::try_from(tag).map_err(|tag| {
            error!("Unknown filter type {} on row {}", tag, y);
            FilterError::UnknownFilterType { row: y, tag }
        })?;

        let (done, rest) = pixels.split_at_mut(y * width);
        let row = &mut rest[..width];
        row.copy_from_slice(&scanline[1..]);
        let prev = if y > 0 { Some(&done[(y - 1) * width..]) } else { None };
        unfilter_row(filter, row, prev);
    }

    debug!("Unfiltered {} rows of {} bytes", height, width);
    Ok(pixels)
}

/// Turns `height` rows of `width` index bytes into filtered scanlines.
pub fn filter_scanlines(
    pixels: &[u8],
    width: usize,
    height: usize,
    strategy: FilterStrategy,
) -> Vec<u8> {
    let mut out = Vec::with_capacity((width + 1) * height);
    let mut candidate = Vec::with_capacity(width);
    let mut best = Vec::with_capacity(width);

    for y in 0..height {
        let row = &pixels[y * width..(y + 1) * width];
        let prev = if y > 0 {
            Some(&pixels[(y - 1) * width..y * width])
        } else {
            None
        };

        match strategy {
            FilterStrategy::None => {
                out.push(FilterType::None as u8);
                out.extend_from_slice(row);
            }
            FilterStrategy::Fixed(filter) => {
                out.push(filter as u8);
                filter_row(filter, row, prev, &mut out);
            }
            FilterStrategy::Adaptive => {
                let mut best_filter = FilterType::None;
                let mut best_score = u64::MAX;
                for filter in FilterType::ALL {
                    candidate.clear();
                    filter_row(filter, row, prev, &mut candidate);
                    let candidate_score = score(&candidate);
                    if candidate_score < best_score {
                        best_score = candidate_score;
                        best_filter = filter;
                        std::mem::swap(&mut best, &mut candidate);
                    }
                }
                out.push(best_filter as u8);
                out.extend_from_slice(&best);
            }
        }
    }

    out
}
