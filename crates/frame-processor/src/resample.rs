//! Spatial resampling of composite rasters.
//!
//! Resampling is a pluggable strategy: the loader holds an optional
//! [`Resampler`] and only asks for one when a downsample factor is given.

use std::fmt::Debug;

use ndarray::{s, Array3};
use num_traits::{NumCast, PrimInt};
use serde::{Deserialize, Serialize};

use nexrad_common::{NexradError, NexradResult};

use crate::types::RasterData;

/// Reduces both spatial dimensions of a raster by an integer factor.
pub trait Resampler: Send + Sync + Debug {
    /// Return a raster of shape `(rows / factor, cols / factor, channels)`
    /// with the same sample type.
    fn resample(&self, data: &RasterData, factor: usize) -> NexradResult<RasterData>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// How a `k x k` block collapses into one output sample.
///
/// - **Mean**: rounded average, matching an anti-aliased image shrink
/// - **Max**: strongest echo in the block
/// - **Nearest**: top-left sample, exact palette colours survive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMethod {
    #[default]
    Mean,
    Max,
    Nearest,
}

/// Block-reduction resampler. Trailing rows and columns that do not fill a
/// whole block are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockResampler {
    method: DownsampleMethod,
}

impl BlockResampler {
    pub fn new(method: DownsampleMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> DownsampleMethod {
        self.method
    }
}

impl Resampler for BlockResampler {
    fn resample(&self, data: &RasterData, factor: usize) -> NexradResult<RasterData> {
        if factor == 0 {
            return Err(NexradError::InvalidArgument(
                "downsample factor must be at least 1".to_string(),
            ));
        }
        let (rows, cols) = data.shape();
        if rows / factor == 0 || cols / factor == 0 {
            return Err(NexradError::InvalidArgument(format!(
                "downsample factor {} is larger than raster {}x{}",
                factor, rows, cols
            )));
        }

        Ok(match data {
            RasterData::U8(a) => RasterData::U8(block_reduce(a, factor, self.method)),
            RasterData::U16(a) => RasterData::U16(block_reduce(a, factor, self.method)),
        })
    }

    fn name(&self) -> &'static str {
        match self.method {
            DownsampleMethod::Mean => "block-mean",
            DownsampleMethod::Max => "block-max",
            DownsampleMethod::Nearest => "block-nearest",
        }
    }
}

/// Collapse each `k x k` block of every channel independently.
fn block_reduce<T: PrimInt>(input: &Array3<T>, k: usize, method: DownsampleMethod) -> Array3<T> {
    let (rows, cols, channels) = input.dim();
    let out_dim = (rows / k, cols / k, channels);
    if k == 1 {
        return input.clone();
    }

    let count = (k * k) as u64;
    Array3::from_shape_fn(out_dim, |(r, c, ch)| {
        let block = input.slice(s![r * k..(r + 1) * k, c * k..(c + 1) * k, ch]);
        match method {
            DownsampleMethod::Mean => {
                let sum: u64 = block.iter().map(|v| v.to_u64().unwrap_or(0)).sum();
                // round half up
                <T as NumCast>::from((sum + count / 2) / count).unwrap_or_else(T::max_value)
            }
            DownsampleMethod::Max => block.iter().copied().fold(T::min_value(), T::max),
            DownsampleMethod::Nearest => block[[0, 0]],
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> Array3<u8> {
        Array3::from_shape_fn((rows, cols, 3), |(r, c, ch)| (r * 10 + c + ch) as u8)
    }

    #[test]
    fn test_mean_2x() {
        let data = RasterData::U8(ramp(4, 4));
        let out = BlockResampler::default().resample(&data, 2).unwrap();
        let out = out.as_u8().unwrap();
        assert_eq!(out.dim(), (2, 2, 3));
        // block {0, 1, 10, 11} averages to 5.5, rounded up
        assert_eq!(out[[0, 0, 0]], 6);
        // block {22, 23, 32, 33} averages to 27.5
        assert_eq!(out[[1, 1, 0]], 28);
    }

    #[test]
    fn test_max_and_nearest() {
        let data = RasterData::U8(ramp(4, 4));
        let max = BlockResampler::new(DownsampleMethod::Max)
            .resample(&data, 2)
            .unwrap();
        assert_eq!(max.as_u8().unwrap()[[0, 0, 0]], 11);

        let nearest = BlockResampler::new(DownsampleMethod::Nearest)
            .resample(&data, 2)
            .unwrap();
        assert_eq!(nearest.as_u8().unwrap()[[1, 0, 2]], 22);
    }

    #[test]
    fn test_partial_blocks_dropped() {
        let data = RasterData::U8(ramp(7, 10));
        let out = BlockResampler::default().resample(&data, 3).unwrap();
        assert_eq!(out.dim(), (2, 3, 3));
    }

    #[test]
    fn test_keeps_sample_type() {
        let data = RasterData::U16(Array3::from_elem((4, 4, 3), 65535u16));
        let out = BlockResampler::default().resample(&data, 4).unwrap();
        assert_eq!(out.as_u16().unwrap()[[0, 0, 0]], 65535);
    }

    #[test]
    fn test_factor_one_is_identity() {
        let data = RasterData::U8(ramp(3, 3));
        assert_eq!(BlockResampler::default().resample(&data, 1).unwrap(), data);
    }

    #[test]
    fn test_rejects_bad_factor() {
        let data = RasterData::U8(ramp(3, 3));
        let r = BlockResampler::default();
        assert!(matches!(r.resample(&data, 0), Err(NexradError::InvalidArgument(_))));
        assert!(matches!(r.resample(&data, 4), Err(NexradError::InvalidArgument(_))));
    }
}
