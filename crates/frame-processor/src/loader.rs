//! Frame loading: decode, validate, resample, normalize, georeference.

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageError};
use ndarray::{s, Array3, Axis};
use num_traits::PrimInt;
use tracing::{debug, instrument};

use georef::{MeshBuilder, WorldFileSource};
use nexrad_common::{parse_frame_timestamp, NexradError, NexradResult};

use crate::resample::{BlockResampler, Resampler};
use crate::types::{Frame, FrameMetadata, RasterData};

/// Per-load options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    /// Transform used to build the mesh
    pub world_file: WorldFileSource,
    /// Integer factor to shrink both spatial dimensions by
    pub downsample: Option<usize>,
    /// Keep a 4th channel and leave black pixels untouched
    pub keep_alpha: bool,
}

impl LoadOptions {
    pub fn with_world_file(mut self, world_file: WorldFileSource) -> Self {
        self.world_file = world_file;
        self
    }

    pub fn with_downsample(mut self, factor: Option<usize>) -> Self {
        self.downsample = factor;
        self
    }

    pub fn with_keep_alpha(mut self, keep_alpha: bool) -> Self {
        self.keep_alpha = keep_alpha;
        self
    }
}

/// Loads composite PNGs into georeferenced [`Frame`]s.
///
/// Frames loaded through the same loader share meshes via its
/// [`MeshBuilder`].
#[derive(Debug, Clone)]
pub struct FrameLoader {
    meshes: MeshBuilder,
    resampler: Option<Arc<dyn Resampler>>,
}

impl Default for FrameLoader {
    fn default() -> Self {
        Self::new(MeshBuilder::new())
    }
}

impl FrameLoader {
    /// Loader with a block-mean resampler.
    pub fn new(meshes: MeshBuilder) -> Self {
        Self {
            meshes,
            resampler: Some(Arc::new(BlockResampler::default())),
        }
    }

    /// Loader that cannot downsample.
    pub fn without_resampler(meshes: MeshBuilder) -> Self {
        Self {
            meshes,
            resampler: None,
        }
    }

    pub fn with_resampler(mut self, resampler: Arc<dyn Resampler>) -> Self {
        self.resampler = Some(resampler);
        self
    }

    pub fn meshes(&self) -> &MeshBuilder {
        &self.meshes
    }

    /// Load a frame.
    ///
    /// Checks run in a fixed order: existence, decode, channel layout,
    /// downsample factor, resampler availability, then mesh and filename
    /// timestamp. Unless `keep_alpha` is set, the result has exactly three
    /// channels and no pure-black pixels.
    #[instrument(skip(self, options), fields(path = %path.display()))]
    pub fn load(&self, path: &Path, options: &LoadOptions) -> NexradResult<Frame> {
        if !path.exists() {
            return Err(NexradError::NotFound(path.to_path_buf()));
        }

        let img = image::open(path).map_err(|e| match e {
            ImageError::IoError(source) => NexradError::io(path, source),
            other => NexradError::format(path, other.to_string()),
        })?;
        let mut data = to_raster(path, img)?;
        debug!(dim = ?data.dim(), sample = %data.sample_type(), "Decoded frame");

        let mut scale = 1;
        if let Some(factor) = options.downsample {
            if factor == 0 {
                return Err(NexradError::InvalidArgument(
                    "downsample factor must be at least 1".to_string(),
                ));
            }
            let resampler = self.resampler.as_ref().ok_or_else(|| {
                NexradError::Dependency(format!(
                    "downsample={} requested but no resampler is configured",
                    factor
                ))
            })?;
            data = resampler.resample(&data, factor)?;
            scale = factor;
            debug!(factor, method = resampler.name(), dim = ?data.dim(), "Resampled frame");
        }

        if !options.keep_alpha {
            data = normalize(data);
        }

        // the mesh spans the native pixels the (possibly shrunk) raster covers
        let (rows, cols) = data.shape();
        let mesh = self
            .meshes
            .build_spanning(&options.world_file, (rows * scale, cols * scale), (rows, cols))?;
        let time = parse_frame_timestamp(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Frame {
            data,
            mesh,
            metadata: FrameMetadata {
                filename,
                time,
                world_file: options.world_file.clone(),
            },
        })
    }
}

/// Convert a decoded image into a `(rows, cols, channels)` raster.
fn to_raster(path: &Path, img: DynamicImage) -> NexradResult<RasterData> {
    let rows = img.height() as usize;
    let cols = img.width() as usize;

    match img {
        DynamicImage::ImageRgb8(buf) => shaped(path, rows, cols, 3, buf.into_raw()).map(RasterData::U8),
        DynamicImage::ImageRgba8(buf) => shaped(path, rows, cols, 4, buf.into_raw()).map(RasterData::U8),
        DynamicImage::ImageRgb16(buf) => shaped(path, rows, cols, 3, buf.into_raw()).map(RasterData::U16),
        DynamicImage::ImageRgba16(buf) => shaped(path, rows, cols, 4, buf.into_raw()).map(RasterData::U16),
        other => Err(NexradError::format(
            path,
            format!(
                "expected an RGB or RGBA raster, got {:?} with {} channel(s)",
                other.color(),
                other.color().channel_count()
            ),
        )),
    }
}

fn shaped<T>(
    path: &Path,
    rows: usize,
    cols: usize,
    channels: usize,
    raw: Vec<T>,
) -> NexradResult<Array3<T>> {
    Array3::from_shape_vec((rows, cols, channels), raw)
        .map_err(|e| NexradError::format(path, e.to_string()))
}

/// Drop alpha and recode no-signal pixels.
pub fn normalize(data: RasterData) -> RasterData {
    match data {
        RasterData::U8(a) => RasterData::U8(recode_no_signal(strip_alpha(a))),
        RasterData::U16(a) => RasterData::U16(recode_no_signal(strip_alpha(a))),
    }
}

fn strip_alpha<T: Clone>(data: Array3<T>) -> Array3<T> {
    if data.dim().2 > 3 {
        data.slice(s![.., .., ..3]).to_owned()
    } else {
        data
    }
}

/// Pixels whose RGB is exactly zero become white (maximum sample value).
///
/// Irreversible: a true black pixel cannot be told apart afterwards.
fn recode_no_signal<T: PrimInt>(mut data: Array3<T>) -> Array3<T> {
    let white = T::max_value();
    for mut px in data.lanes_mut(Axis(2)) {
        if px.iter().all(|v| v.is_zero()) {
            px.iter_mut().for_each(|v| *v = white);
        }
    }
    data
}
