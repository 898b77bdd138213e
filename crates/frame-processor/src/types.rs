//! Core types for composite frames.

use std::sync::Arc;

use chrono::NaiveDateTime;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use georef::{GeoMesh, WorldFileSource};

/// Sample type of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    U8,
    U16,
}

impl SampleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::U8 => "u8",
            SampleType::U16 => "u16",
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel data laid out as `(rows, cols, channels)`.
///
/// Only unsigned 8- and 16-bit samples exist; anything else is rejected at
/// decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    U8(Array3<u8>),
    U16(Array3<u16>),
}

impl RasterData {
    /// Full shape `(rows, cols, channels)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        match self {
            RasterData::U8(a) => a.dim(),
            RasterData::U16(a) => a.dim(),
        }
    }

    /// Spatial shape `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.dim();
        (rows, cols)
    }

    pub fn channels(&self) -> usize {
        self.dim().2
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            RasterData::U8(_) => SampleType::U8,
            RasterData::U16(_) => SampleType::U16,
        }
    }

    /// Zero-filled raster of the given sample type.
    pub fn zeros(sample_type: SampleType, dim: (usize, usize, usize)) -> Self {
        match sample_type {
            SampleType::U8 => RasterData::U8(Array3::zeros(dim)),
            SampleType::U16 => RasterData::U16(Array3::zeros(dim)),
        }
    }

    pub fn as_u8(&self) -> Option<&Array3<u8>> {
        match self {
            RasterData::U8(a) => Some(a),
            RasterData::U16(_) => None,
        }
    }

    pub fn as_u16(&self) -> Option<&Array3<u16>> {
        match self {
            RasterData::U16(a) => Some(a),
            RasterData::U8(_) => None,
        }
    }
}

/// Provenance of a loaded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameMetadata {
    /// File name without directory
    pub filename: String,
    /// Acquisition time parsed from the filename
    pub time: NaiveDateTime,
    /// World file used for the mesh
    pub world_file: WorldFileSource,
}

/// A georeferenced composite frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: RasterData,
    /// Shared with every other frame of the same shape and world file
    pub mesh: Arc<GeoMesh>,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    pub fn time(&self) -> NaiveDateTime {
        self.metadata.time
    }
}
