//! Raster and sidecar output.
//!
//! Every product is a PNG plus a JSON file of the same stem holding the
//! coordinates needed to place it on a map.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use frame_processor::{Cut, CutAxis, Frame, Keogram, RasterData, SampleType};
use georef::WorldFileSource;
use image::{ImageBuffer, Rgb, Rgba};
use ndarray::Array3;
use nexrad_common::FRAME_PREFIX;
use serde::Serialize;
use tracing::debug;

/// Coordinate sidecar for a single frame.
#[derive(Debug, Serialize)]
pub struct FrameSidecar {
    pub source: String,
    pub time: NaiveDateTime,
    /// `[rows, cols]`
    pub shape: [usize; 2],
    pub channels: usize,
    pub sample_type: SampleType,
    /// `[north, south]` row centres
    pub lat: [f64; 2],
    /// `[west, east]` column centres
    pub lon: [f64; 2],
    pub world_file: WorldFileSource,
}

impl FrameSidecar {
    pub fn new(frame: &Frame) -> Self {
        let (rows, cols) = frame.shape();
        let mesh = &frame.mesh;
        Self {
            source: frame.metadata.filename.clone(),
            time: frame.metadata.time,
            shape: [rows, cols],
            channels: frame.data.channels(),
            sample_type: frame.data.sample_type(),
            lat: [first(&mesh.lat), last(&mesh.lat)],
            lon: [first(&mesh.lon), last(&mesh.lon)],
            world_file: frame.metadata.world_file.clone(),
        }
    }
}

/// Coordinate sidecar for a keogram. Image rows follow `space`, columns
/// follow `times`.
#[derive(Debug, Serialize)]
pub struct KeogramSidecar<'a> {
    pub cut: Cut,
    /// Name of the coordinate along image rows
    pub space_axis: &'static str,
    pub space: &'a [f64],
    pub times: &'a [NaiveDateTime],
    pub matched: &'a [f64],
    pub sources: [String; 2],
}

fn first(v: &[f64]) -> f64 {
    v.first().copied().unwrap_or(f64::NAN)
}

fn last(v: &[f64]) -> f64 {
    v.last().copied().unwrap_or(f64::NAN)
}

/// `nexrad2018-01-01T00:00:00.png` becomes `map2018-01-01T00:00:00`.
pub fn map_stem(frame_filename: &str) -> String {
    let stem = Path::new(frame_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = stem.strip_prefix(FRAME_PREFIX).unwrap_or(&stem);
    format!("map{}", stamp)
}

/// `keo-<axis><value>-<first stem>-<last stem>`, with the value as typed.
pub fn keogram_stem(axis: CutAxis, value: &str, files: &[PathBuf]) -> String {
    let stem = |p: Option<&PathBuf>| {
        p.and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    format!(
        "keo-{}{}-{}-{}",
        axis,
        value,
        stem(files.first()),
        stem(files.last())
    )
}

/// Write a frame as `<odir>/<map stem>.png` plus its sidecar.
pub fn write_frame(frame: &Frame, odir: &Path) -> Result<PathBuf> {
    let stem = map_stem(&frame.metadata.filename);
    let png = odir.join(format!("{}.png", stem));

    save_raster(&frame.data, &png)?;
    write_json(&odir.join(format!("{}.json", stem)), &FrameSidecar::new(frame))?;
    Ok(png)
}

/// Write a keogram as `<odir>/<stem>.png` plus its sidecar.
pub fn write_keogram(keo: &Keogram, stem: &str, files: &[PathBuf], odir: &Path) -> Result<PathBuf> {
    let png = odir.join(format!("{}.png", stem));
    save_raster(&keo.data, &png)?;

    let name = |p: Option<&PathBuf>| {
        p.and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let sidecar = KeogramSidecar {
        cut: keo.cut,
        space_axis: keo.cut.axis.space_axis(),
        space: &keo.space,
        times: &keo.times,
        matched: &keo.matched,
        sources: [name(files.first()), name(files.last())],
    };
    write_json(&odir.join(format!("{}.json", stem)), &sidecar)?;
    Ok(png)
}

/// Encode a `(rows, cols, channels)` raster as PNG.
pub fn save_raster(data: &RasterData, path: &Path) -> Result<()> {
    let (rows, cols, channels) = data.dim();
    let (w, h) = (cols as u32, rows as u32);

    let saved = match (data, channels) {
        (RasterData::U8(a), 3) => {
            ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, row_major(a)).map(|img| img.save(path))
        }
        (RasterData::U8(a), 4) => {
            ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, row_major(a)).map(|img| img.save(path))
        }
        (RasterData::U16(a), 3) => {
            ImageBuffer::<Rgb<u16>, _>::from_raw(w, h, row_major(a)).map(|img| img.save(path))
        }
        (RasterData::U16(a), 4) => {
            ImageBuffer::<Rgba<u16>, _>::from_raw(w, h, row_major(a)).map(|img| img.save(path))
        }
        (_, n) => bail!("cannot encode a raster with {} channels", n),
    };

    match saved {
        Some(result) => result.with_context(|| format!("Failed to write {}", path.display()))?,
        None => bail!("pixel buffer does not match {}x{}x{}", rows, cols, channels),
    }
    debug!(path = %path.display(), rows, cols, channels, "Wrote raster");
    Ok(())
}

/// Samples in logical `(row, col, channel)` order regardless of memory layout.
fn row_major<T: Clone>(a: &Array3<T>) -> Vec<T> {
    a.iter().cloned().collect()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
