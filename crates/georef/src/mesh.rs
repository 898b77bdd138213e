//! Latitude/longitude meshes derived from world files.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use nexrad_common::NexradResult;

use crate::cache::{MeshCache, MeshKey};
use crate::world_file::{WorldFile, WorldFileSource};

/// Coordinate vectors for a north-up raster.
///
/// `lat[i]` labels row `i` (index 0 is the northernmost row, values strictly
/// descending); `lon[j]` labels column `j` (strictly ascending).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoMesh {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl GeoMesh {
    /// Build the mesh for a `(rows, cols)` raster.
    ///
    /// Both vectors span the full raster extent implied by the transform,
    /// endpoints included, so resampled rasters keep the same footprint.
    pub fn from_world_file(wld: &WorldFile, shape: (usize, usize)) -> Self {
        Self::spanning(wld, shape, shape)
    }

    /// Mesh with `shape` samples spread over the footprint of `extent`
    /// native pixels, as needed after downsampling.
    pub fn spanning(wld: &WorldFile, extent: (usize, usize), shape: (usize, usize)) -> Self {
        let (north, south) = wld.lat_extent(extent.0);
        let (west, east) = wld.lon_extent(extent.1);

        Self {
            lat: linspace(north, south, shape.0),
            lon: linspace(west, east, shape.1),
        }
    }

    /// Raster shape `(rows, cols)` this mesh labels.
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// Nearest row to latitude `value`, with the latitude found there.
    pub fn nearest_lat(&self, value: f64) -> Option<(usize, f64)> {
        nearest_index(&self.lat, value)
    }

    /// Nearest column to longitude `value`, with the longitude found there.
    pub fn nearest_lon(&self, value: f64) -> Option<(usize, f64)> {
        nearest_index(&self.lon, value)
    }
}

/// `n` evenly spaced samples from `start` to `stop`, both included.
///
/// Each element is computed as `start + i * delta` rather than by repeated
/// addition, and the final element is pinned to `stop`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let delta = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * delta).collect();
            out[n - 1] = stop;
            out
        }
    }
}

/// Index and value of the coordinate closest to `value`; first wins on ties.
pub fn nearest_index(coords: &[f64], value: f64) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &c) in coords.iter().enumerate() {
        let better = match best {
            None => true,
            Some((_, b)) => (c - value).abs() < (b - value).abs(),
        };
        if better {
            best = Some((i, c));
        }
    }
    best
}

/// Builds meshes through a shared [`MeshCache`].
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    cache: Arc<MeshCache>,
}

impl MeshBuilder {
    /// Builder with a fresh private cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder sharing an existing cache.
    pub fn with_cache(cache: Arc<MeshCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<MeshCache> {
        &self.cache
    }

    /// Mesh for a raster of `shape` georeferenced by `source`.
    ///
    /// Repeated calls with equal arguments return the same `Arc` without
    /// reading the world file again.
    pub fn build(
        &self,
        source: &WorldFileSource,
        shape: (usize, usize),
    ) -> NexradResult<Arc<GeoMesh>> {
        self.build_spanning(source, shape, shape)
    }

    /// Mesh of `shape` samples covering `extent` native pixels.
    ///
    /// A raster downsampled by `k` keeps its footprint: pass
    /// `extent = (rows * k, cols * k)` for a `(rows, cols)` result.
    #[instrument(skip(self, source), fields(source = %source))]
    pub fn build_spanning(
        &self,
        source: &WorldFileSource,
        extent: (usize, usize),
        shape: (usize, usize),
    ) -> NexradResult<Arc<GeoMesh>> {
        let key = MeshKey::spanning(source.clone(), extent, shape);
        if let Some(mesh) = self.cache.get(&key) {
            debug!(rows = shape.0, cols = shape.1, "Mesh cache hit");
            return Ok(mesh);
        }

        let wld = WorldFile::load(source)?;
        let mesh = Arc::new(GeoMesh::spanning(&wld, extent, shape));
        debug!(
            rows = shape.0,
            cols = shape.1,
            north = wld.origin_y,
            west = wld.origin_x,
            "Built georeference mesh"
        );

        self.cache.insert(key, Arc::clone(&mesh));
        Ok(mesh)
    }
}
