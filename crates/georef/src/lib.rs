//! Georeferencing for composite radar rasters.
//!
//! A world file describes the affine map from pixel index to geographic
//! coordinate. For the north-up, unrotated rasters published by the archive
//! that map separates into one latitude per row and one longitude per
//! column, which is what [`GeoMesh`] holds.
//!
//! # Architecture
//!
//! ```text
//! MeshBuilder::build(source, (rows, cols))
//!      │
//!      ├─► MeshCache lookup by (source, shape)
//!      │         │
//!      │         ├─► hit: return the shared Arc<GeoMesh>
//!      │         │
//!      │         └─► miss: read world file, linspace lat/lon
//!      │
//!      └─► insert (idempotent overwrite) and return
//! ```

pub mod cache;
pub mod mesh;
pub mod world_file;

pub use cache::{MeshCache, MeshCacheStats, MeshKey};
pub use mesh::{linspace, GeoMesh, MeshBuilder};
pub use world_file::{WorldFile, WorldFileSource};
