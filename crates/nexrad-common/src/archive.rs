//! Naming conventions for the IEM composite archive and local frame files.
//!
//! Remote resources live at
//! `<base><Y>/<m>/<d>/GIS/uscomp/n0q_<Y><m><d><H><M>.png`; local copies are
//! named `nexrad<ISO 8601 timestamp>.png`. The local filename is the only
//! place a frame's acquisition time is recorded.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NexradError, NexradResult};

/// Default archive root (trailing slash included).
pub const DEFAULT_ARCHIVE_BASE: &str = "https://mesonet.agron.iastate.edu/archive/data/";

/// Fixed prefix of every local frame filename.
pub const FRAME_PREFIX: &str = "nexrad";

/// How the time part of a local filename separates hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameStyle {
    /// `nexrad2018-01-01T00:00:00.png`
    Colons,
    /// `nexrad2018-01-01T00-00-00.png`, for filesystems that reject `:`
    Dashes,
}

impl FilenameStyle {
    /// The style usable on the current platform.
    pub fn native() -> Self {
        if cfg!(windows) {
            FilenameStyle::Dashes
        } else {
            FilenameStyle::Colons
        }
    }
}

impl Default for FilenameStyle {
    fn default() -> Self {
        Self::native()
    }
}

/// Build the remote URL of the composite valid at `t`.
pub fn archive_url(base: &str, t: NaiveDateTime) -> String {
    let base = base.trim_end_matches('/');
    format!(
        "{}/{}/GIS/uscomp/n0q_{}.png",
        base,
        t.format("%Y/%m/%d"),
        t.format("%Y%m%d%H%M")
    )
}

/// Build the local filename for the composite valid at `t`.
pub fn local_filename(t: NaiveDateTime, style: FilenameStyle) -> String {
    let stamp = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    let stamp = match style {
        FilenameStyle::Colons => stamp,
        FilenameStyle::Dashes => stamp.replace(':', "-"),
    };
    format!("{}{}.png", FRAME_PREFIX, stamp)
}

/// Recover the acquisition time encoded in a frame filename.
///
/// Accepts both separator styles as well as an explicit UTC offset.
pub fn parse_frame_timestamp(path: &Path) -> NexradResult<NaiveDateTime> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| NexradError::parse(path.display().to_string(), "no UTF-8 file stem"))?;

    let stamp = stem.strip_prefix(FRAME_PREFIX).ok_or_else(|| {
        NexradError::parse(stem, format!("filename must start with '{}'", FRAME_PREFIX))
    })?;

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H-%M-%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H-%M",
    ] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(stamp, fmt) {
            return Ok(ndt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(stamp) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }

    Err(NexradError::parse(stem, "no ISO 8601 timestamp after prefix"))
}
