//! Memoization of georeference meshes.
//!
//! Entries are keyed by world-file source and raster shape. Population is
//! idempotent: two workers missing on the same key both compute the same
//! mesh and the later insert simply overwrites the earlier one. The lock
//! guards the map only, never the computation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::mesh::GeoMesh;
use crate::world_file::WorldFileSource;

/// Cache key: world-file source, covered native extent and mesh shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshKey {
    pub source: WorldFileSource,
    /// Native `(rows, cols)` the mesh spans
    pub extent: (usize, usize),
    /// Number of `(lat, lon)` samples
    pub shape: (usize, usize),
}

impl MeshKey {
    /// Key for a full-resolution raster.
    pub fn new(source: WorldFileSource, shape: (usize, usize)) -> Self {
        Self::spanning(source, shape, shape)
    }

    /// Key for a raster of `shape` covering `extent` native pixels.
    pub fn spanning(source: WorldFileSource, extent: (usize, usize), shape: (usize, usize)) -> Self {
        Self {
            source,
            extent,
            shape,
        }
    }
}

/// Statistics for the mesh cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MeshCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl MeshCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Shared store of computed meshes.
///
/// Holds no file handles; evicting (or never evicting) is always safe.
#[derive(Debug, Default)]
pub struct MeshCache {
    entries: RwLock<HashMap<MeshKey, Arc<GeoMesh>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a mesh, counting the hit or miss.
    pub fn get(&self, key: &MeshKey) -> Option<Arc<GeoMesh>> {
        // A poisoned map is still consistent since every write is a whole insert.
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(mesh) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(mesh))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Check presence without touching statistics.
    pub fn contains(&self, key: &MeshKey) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(key)
    }

    /// Store a mesh, replacing any existing entry for the key.
    pub fn insert(&self, key: MeshKey, mesh: Arc<GeoMesh>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, mesh);
    }

    /// Remove a single entry.
    pub fn evict(&self, key: &MeshKey) -> Option<Arc<GeoMesh>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key)
    }

    /// Drop all entries. Statistics are kept.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> MeshCacheStats {
        MeshCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
