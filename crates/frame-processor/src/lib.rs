//! Composite frame processing.
//!
//! Turns archive PNGs into georeferenced frames and stacks fixed cuts from
//! many frames into keograms.
//!
//! # Architecture
//!
//! ```text
//! FrameLoader::load(path, options)
//!      │
//!      ├─► decode PNG (RGB/RGBA, 8 or 16 bit)
//!      │
//!      ├─► Resampler (optional, block reduction)
//!      │
//!      ├─► strip alpha, recode black to white
//!      │
//!      └─► MeshBuilder (cached) + filename timestamp
//!               │
//!               ▼
//!             Frame ──► KeogramBuilder::build(files, cut)
//!                            │
//!                            └─► (space, time, channel) stack
//! ```
//!
//! # Example
//!
//! ```ignore
//! use frame_processor::{Cut, FrameLoader, KeogramBuilder, LoadOptions};
//!
//! let loader = FrameLoader::default();
//! let frame = loader.load(path, &LoadOptions::default().with_downsample(Some(4)))?;
//!
//! let keo = KeogramBuilder::new(loader, LoadOptions::default())
//!     .build(&files, Cut::parse("lat", "45.0")?)?;
//! ```

pub mod keogram;
pub mod loader;
pub mod resample;
pub mod types;

pub use keogram::{Cut, CutAxis, Keogram, KeogramBuilder, KEOGRAM_TOLERANCE};
pub use loader::{normalize, FrameLoader, LoadOptions};
pub use resample::{BlockResampler, DownsampleMethod, Resampler};
pub use types::{Frame, FrameMetadata, RasterData, SampleType};
