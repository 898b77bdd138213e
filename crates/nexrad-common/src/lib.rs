//! Common types and utilities shared across the NEXRAD composite tools.

pub mod archive;
pub mod error;
pub mod time;

pub use archive::{
    archive_url, local_filename, parse_frame_timestamp, FilenameStyle, DEFAULT_ARCHIVE_BASE,
    FRAME_PREFIX,
};
pub use error::{NexradError, NexradResult};
pub use time::{parse_timestamp, time_grid};
