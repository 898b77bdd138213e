//! Synthetic composite rasters and sidecar files.
//!
//! Generated pixels follow a predictable pattern so tests can verify that
//! rows and columns end up where they belong after loading, resampling and
//! keogram slicing.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use image::{ImageBuffer, Luma, Rgb, Rgba};
use nexrad_common::{local_filename, FilenameStyle};

use crate::fixtures::palette;

/// Colour of pixel `(row, col)` in the test pattern.
///
/// Red encodes the row, green the column; no pixel is ever black.
pub fn pattern_pixel(row: usize, col: usize) -> [u8; 3] {
    [
        (row % 250) as u8 + 1,
        (col % 250) as u8 + 1,
        ((row + col) % 250) as u8 + 1,
    ]
}

/// Row-major RGB bytes of the test pattern.
pub fn create_pattern_rgb(rows: usize, cols: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(rows * cols * 3);
    for row in 0..rows {
        for col in 0..cols {
            pixels.extend_from_slice(&pattern_pixel(row, col));
        }
    }
    pixels
}

/// Radar-like RGB bytes: black "no echo" background with a band of
/// reflectivity colours across the middle rows.
pub fn create_echo_band_rgb(rows: usize, cols: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(rows * cols * 3);
    for row in 0..rows {
        for col in 0..cols {
            let in_band = row >= rows / 3 && row < 2 * rows / 3;
            let color = if in_band {
                palette::REFLECTIVITY[col % palette::REFLECTIVITY.len()]
            } else {
                palette::NO_ECHO
            };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

/// Write an 8-bit RGB PNG.
pub fn write_rgb_png(path: &Path, rows: usize, cols: usize, pixels: Vec<u8>) {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(cols as u32, rows as u32, pixels).expect("pixel buffer size");
    img.save(path).expect("write RGB PNG");
}

/// Write an 8-bit RGBA PNG from RGB bytes plus a constant alpha.
pub fn write_rgba_png(path: &Path, rows: usize, cols: usize, rgb: &[u8], alpha: u8) {
    let mut pixels = Vec::with_capacity(rows * cols * 4);
    for px in rgb.chunks_exact(3) {
        pixels.extend_from_slice(px);
        pixels.push(alpha);
    }
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(cols as u32, rows as u32, pixels).expect("pixel buffer size");
    img.save(path).expect("write RGBA PNG");
}

/// Write a 16-bit RGB PNG, scaling the 8-bit pattern by 257.
pub fn write_rgb16_png(path: &Path, rows: usize, cols: usize, rgb: &[u8]) {
    let pixels: Vec<u16> = rgb.iter().map(|&v| v as u16 * 257).collect();
    let img: ImageBuffer<Rgb<u16>, Vec<u16>> =
        ImageBuffer::from_raw(cols as u32, rows as u32, pixels).expect("pixel buffer size");
    img.save(path).expect("write RGB16 PNG");
}

/// Write a single-channel PNG (an invalid composite layout).
pub fn write_gray_png(path: &Path, rows: usize, cols: usize) {
    let img: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| Luma([((x + y) % 256) as u8]));
    img.save(path).expect("write gray PNG");
}

/// Write the test pattern as a frame named for `time` inside `dir`.
pub fn write_pattern_frame(dir: &Path, time: NaiveDateTime, rows: usize, cols: usize) -> PathBuf {
    let path = dir.join(local_filename(time, FilenameStyle::native()));
    write_rgb_png(&path, rows, cols, create_pattern_rgb(rows, cols));
    path
}

/// Write a world file with the given contents.
pub fn write_world_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write world file");
    path
}
