//! World-file parsing.
//!
//! A world file holds six numbers, one transform term each, in the order
//! `px_size_x, rot1, rot2, px_size_y, origin_x, origin_y`. The origin is the
//! centre of the upper-left pixel.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use nexrad_common::{NexradError, NexradResult};

/// World file shipped with the archive's `n0q` composites (EPSG:4326).
const BUNDLED_N0Q: &str = include_str!("../data/n0q.wld");

/// Where a world file comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorldFileSource {
    /// The embedded `n0q.wld` matching the archive composites.
    #[default]
    Bundled,
    /// A sidecar file on disk.
    File(PathBuf),
}

impl WorldFileSource {
    /// Bundled unless a path is given.
    pub fn from_option(path: Option<&Path>) -> Self {
        match path {
            Some(p) => WorldFileSource::File(p.to_path_buf()),
            None => WorldFileSource::Bundled,
        }
    }
}

impl fmt::Display for WorldFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldFileSource::Bundled => write!(f, "<bundled n0q.wld>"),
            WorldFileSource::File(p) => write!(f, "{}", p.display()),
        }
    }
}

impl From<PathBuf> for WorldFileSource {
    fn from(path: PathBuf) -> Self {
        WorldFileSource::File(path)
    }
}

impl From<&Path> for WorldFileSource {
    fn from(path: &Path) -> Self {
        WorldFileSource::File(path.to_path_buf())
    }
}

/// The six affine terms of a world file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldFile {
    /// Pixel width in degrees (positive)
    pub px_size_x: f64,
    /// Row rotation term
    pub rot1: f64,
    /// Column rotation term
    pub rot2: f64,
    /// Pixel height in degrees (negative for north-up rasters)
    pub px_size_y: f64,
    /// Longitude of the upper-left pixel centre
    pub origin_x: f64,
    /// Latitude of the upper-left pixel centre
    pub origin_y: f64,
}

impl WorldFile {
    /// Load the world file named by `source`.
    pub fn load(source: &WorldFileSource) -> NexradResult<Self> {
        match source {
            WorldFileSource::Bundled => Self::parse(BUNDLED_N0Q, &source.to_string()),
            WorldFileSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    NexradError::configuration(path.display().to_string(), e.to_string())
                })?;
                Self::parse(&text, &path.display().to_string())
            }
        }
    }

    /// Parse world-file text. `name` only labels errors.
    pub fn parse(text: &str, name: &str) -> NexradResult<Self> {
        let mut terms = [0.0f64; 6];
        let mut count = 0;

        for token in text.split_whitespace() {
            if count == terms.len() {
                break;
            }
            terms[count] = token.parse().map_err(|_| {
                NexradError::configuration(
                    name,
                    format!("field {} is not a number: '{}'", count + 1, token),
                )
            })?;
            count += 1;
        }

        if count < terms.len() {
            return Err(NexradError::configuration(
                name,
                format!("expected 6 numeric fields, found {}", count),
            ));
        }

        let wld = WorldFile {
            px_size_x: terms[0],
            rot1: terms[1],
            rot2: terms[2],
            px_size_y: terms[3],
            origin_x: terms[4],
            origin_y: terms[5],
        };
        wld.validate(name)?;
        Ok(wld)
    }

    /// North-up, unrotated and finite.
    fn validate(&self, name: &str) -> NexradResult<()> {
        let all = [
            self.px_size_x,
            self.rot1,
            self.rot2,
            self.px_size_y,
            self.origin_x,
            self.origin_y,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(NexradError::configuration(name, "non-finite transform term"));
        }
        if self.px_size_x <= 0.0 {
            return Err(NexradError::configuration(
                name,
                format!("pixel width must be positive, got {}", self.px_size_x),
            ));
        }
        if self.px_size_y >= 0.0 {
            return Err(NexradError::configuration(
                name,
                format!("pixel height must be negative (north-up), got {}", self.px_size_y),
            ));
        }
        if self.rot1 != 0.0 || self.rot2 != 0.0 {
            return Err(NexradError::configuration(
                name,
                "rotated rasters cannot be described by a lat/lon mesh",
            ));
        }
        Ok(())
    }

    /// Latitude span `(north, south)` for a raster with `rows` rows.
    pub fn lat_extent(&self, rows: usize) -> (f64, f64) {
        (self.origin_y, self.origin_y + rows as f64 * self.px_size_y)
    }

    /// Longitude span `(west, east)` for a raster with `cols` columns.
    pub fn lon_extent(&self, cols: usize) -> (f64, f64) {
        (self.origin_x, self.origin_x + cols as f64 * self.px_size_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_is_n0q() {
        let wld = WorldFile::load(&WorldFileSource::Bundled).unwrap();
        assert_eq!(wld.px_size_x, 0.005);
        assert_eq!(wld.px_size_y, -0.005);
        assert_eq!(wld.origin_x, -126.0);
        assert_eq!(wld.origin_y, 50.0);
    }

    #[test]
    fn test_parse_accepts_mixed_whitespace() {
        let wld = WorldFile::parse("0.01 0\n0\t-0.01\r\n-100.0  40.0\n", "inline").unwrap();
        assert_eq!(wld.px_size_x, 0.01);
        assert_eq!(wld.origin_x, -100.0);
        assert_eq!(wld.origin_y, 40.0);
    }

    #[test]
    fn test_parse_too_few_fields() {
        let err = WorldFile::parse("0.005\n0.0\n0.0\n-0.005\n-126.0\n", "short.wld").unwrap_err();
        assert!(matches!(err, NexradError::Configuration { .. }));
        assert!(err.to_string().contains("found 5"));
    }

    #[test]
    fn test_parse_non_numeric() {
        let err = WorldFile::parse("0.005 0 0 abc -126 50", "bad.wld").unwrap_err();
        assert!(matches!(err, NexradError::Configuration { .. }));
    }

    #[test]
    fn test_parse_rejects_south_up() {
        let err = WorldFile::parse("0.005 0 0 0.005 -126 50", "southup.wld").unwrap_err();
        assert!(err.to_string().contains("north-up"));
    }

    #[test]
    fn test_parse_rejects_rotation() {
        assert!(WorldFile::parse("0.005 0.001 0 -0.005 -126 50", "rot.wld").is_err());
    }

    #[test]
    fn test_missing_file() {
        let source = WorldFileSource::File(PathBuf::from("/nonexistent/n0q.wld"));
        assert!(matches!(
            WorldFile::load(&source),
            Err(NexradError::Configuration { .. })
        ));
    }

    #[test]
    fn test_extents() {
        let wld = WorldFile::load(&WorldFileSource::Bundled).unwrap();
        let (north, south) = wld.lat_extent(5400);
        let (west, east) = wld.lon_extent(12200);
        assert!((north - 50.0).abs() < 1e-9);
        assert!((south - 23.0).abs() < 1e-9);
        assert!((west + 126.0).abs() < 1e-9);
        assert!((east + 65.0).abs() < 1e-9);
    }
}
