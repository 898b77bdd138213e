//! Keogram assembly.
//!
//! A keogram stacks the same latitude row (or longitude column) from a
//! sequence of frames. The result is laid out `(space, time, channel)`:
//! for a latitude cut `space` runs along longitude, for a longitude cut it
//! runs along latitude.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use nexrad_common::{NexradError, NexradResult};

use crate::loader::{FrameLoader, LoadOptions};
use crate::types::{Frame, RasterData};

/// Maximum distance in degrees between a requested cut and the matched
/// mesh coordinate.
pub const KEOGRAM_TOLERANCE: f64 = 0.1;

/// The axis a keogram cut is taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutAxis {
    /// Fixed latitude; space runs along longitude
    Lat,
    /// Fixed longitude; space runs along latitude
    Lon,
}

impl CutAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            CutAxis::Lat => "lat",
            CutAxis::Lon => "lon",
        }
    }

    /// Name of the axis retained in the keogram.
    pub fn space_axis(&self) -> &'static str {
        match self {
            CutAxis::Lat => "lon",
            CutAxis::Lon => "lat",
        }
    }
}

impl fmt::Display for CutAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CutAxis {
    type Err = NexradError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lat" => Ok(CutAxis::Lat),
            "lon" => Ok(CutAxis::Lon),
            other => Err(NexradError::InvalidArgument(format!(
                "unknown cut axis '{}', expected 'lat' or 'lon'",
                other
            ))),
        }
    }
}

/// A requested keogram cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub axis: CutAxis,
    /// Coordinate in degrees
    pub value: f64,
}

impl Cut {
    pub fn new(axis: CutAxis, value: f64) -> Self {
        Self { axis, value }
    }

    /// Parse an `(axis, value)` pair as given on a command line.
    pub fn parse(axis: &str, value: &str) -> NexradResult<Self> {
        let axis = axis.parse()?;
        let value: f64 = value.trim().parse().map_err(|_| {
            NexradError::InvalidArgument(format!("cut value '{}' is not a number", value))
        })?;
        if !value.is_finite() {
            return Err(NexradError::InvalidArgument(format!(
                "cut value must be finite, got {}",
                value
            )));
        }
        Ok(Self { axis, value })
    }
}

impl fmt::Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.axis, self.value)
    }
}

/// A time/space slice through a frame sequence.
#[derive(Debug, Clone)]
pub struct Keogram {
    /// `(space, time, channel)`
    pub data: RasterData,
    /// Coordinates along the space axis, from the first frame
    pub space: Vec<f64>,
    /// Acquisition time of each column, in input order
    pub times: Vec<NaiveDateTime>,
    pub cut: Cut,
    /// Mesh coordinate actually used for each frame
    pub matched: Vec<f64>,
}

impl Keogram {
    /// `(space, time, channels)`
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn num_frames(&self) -> usize {
        self.times.len()
    }
}

/// Builds keograms from frame files.
#[derive(Debug, Clone)]
pub struct KeogramBuilder {
    loader: FrameLoader,
    options: LoadOptions,
    tolerance: f64,
}

impl KeogramBuilder {
    /// Frames are loaded with `options`, except that alpha is always dropped.
    pub fn new(loader: FrameLoader, options: LoadOptions) -> Self {
        Self {
            loader,
            options: options.with_keep_alpha(false),
            tolerance: KEOGRAM_TOLERANCE,
        }
    }

    /// Maximum distance in degrees between the cut and the matched
    /// coordinate. Must be finite and non-negative; `build` rejects
    /// anything else.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Build a keogram from `files`.
    ///
    /// Column `t` comes from `files[t]`; the list is never re-sorted. The
    /// first frame fixes space length, channel count and sample type, and
    /// every frame must match it. Any failing frame aborts the build.
    #[instrument(skip(self, files), fields(frames = files.len(), cut = %cut))]
    pub fn build(&self, files: &[PathBuf], cut: Cut) -> NexradResult<Keogram> {
        if !cut.value.is_finite() {
            return Err(NexradError::InvalidArgument(format!(
                "cut value must be finite, got {}",
                cut.value
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(NexradError::InvalidArgument(format!(
                "keogram tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }

        let (first, rest) = files.split_first().ok_or_else(|| {
            NexradError::InvalidArgument("keogram needs at least one frame".to_string())
        })?;

        let template = self.loader.load(first, &self.options)?;
        let space = match cut.axis {
            CutAxis::Lat => template.mesh.lon.clone(),
            CutAxis::Lon => template.mesh.lat.clone(),
        };
        let channels = template.data.channels();
        let sample_type = template.data.sample_type();

        let mut data = RasterData::zeros(sample_type, (space.len(), files.len(), channels));
        let mut times = Vec::with_capacity(files.len());
        let mut matched = Vec::with_capacity(files.len());

        let frames = std::iter::once(Ok((first, template)))
            .chain(rest.iter().map(|p| self.loader.load(p, &self.options).map(|f| (p, f))));

        for (t, loaded) in frames.enumerate() {
            let (path, frame) = loaded?;

            let space_len = match cut.axis {
                CutAxis::Lat => frame.mesh.lon.len(),
                CutAxis::Lon => frame.mesh.lat.len(),
            };
            let frame_channels = frame.data.channels();
            if space_len != space.len()
                || frame_channels != channels
                || frame.data.sample_type() != sample_type
            {
                return Err(NexradError::format(
                    path,
                    format!(
                        "frame has space length {}, {} channels, {} samples; first frame has {}, {}, {}",
                        space_len,
                        frame_channels,
                        frame.data.sample_type(),
                        space.len(),
                        channels,
                        sample_type
                    ),
                ));
            }

            let (index, coord) = self.match_cut(path, &frame, cut)?;
            write_column(&mut data, &frame.data, cut.axis, index, t, path)?;

            info!(
                frame = t + 1,
                total = files.len(),
                file = %frame.metadata.filename,
                matched = coord,
                "Added keogram column"
            );
            times.push(frame.metadata.time);
            matched.push(coord);
        }

        Ok(Keogram {
            data,
            space,
            times,
            cut,
            matched,
        })
    }

    /// Nearest row or column to the cut, within tolerance.
    fn match_cut(&self, path: &Path, frame: &Frame, cut: Cut) -> NexradResult<(usize, f64)> {
        let nearest = match cut.axis {
            CutAxis::Lat => frame.mesh.nearest_lat(cut.value),
            CutAxis::Lon => frame.mesh.nearest_lon(cut.value),
        }
        .ok_or_else(|| NexradError::format(path, "frame has an empty mesh"))?;

        // Inclusive bound; a NaN distance never passes.
        let distance = (nearest.1 - cut.value).abs();
        if distance.is_nan() || distance > self.tolerance {
            return Err(NexradError::OutOfTolerance {
                path: path.to_path_buf(),
                axis: cut.axis.as_str(),
                value: cut.value,
                nearest: nearest.1,
                tolerance: self.tolerance,
            });
        }
        Ok(nearest)
    }
}

/// Copy row (lat cut) or column (lon cut) `index` of `src` into time column `t`.
fn write_column(
    out: &mut RasterData,
    src: &RasterData,
    axis: CutAxis,
    index: usize,
    t: usize,
    path: &Path,
) -> NexradResult<()> {
    match (out, src) {
        (RasterData::U8(out), RasterData::U8(src)) => copy_cut(out, src, axis, index, t),
        (RasterData::U16(out), RasterData::U16(src)) => copy_cut(out, src, axis, index, t),
        _ => {
            return Err(NexradError::format(
                path,
                "sample type differs from the first frame",
            ))
        }
    }
    Ok(())
}

fn copy_cut<T: Clone>(out: &mut Array3<T>, src: &Array3<T>, axis: CutAxis, index: usize, t: usize) {
    let slice = match axis {
        CutAxis::Lat => src.index_axis(Axis(0), index),
        CutAxis::Lon => src.index_axis(Axis(1), index),
    };
    out.index_axis_mut(Axis(1), t).assign(&slice);
}
