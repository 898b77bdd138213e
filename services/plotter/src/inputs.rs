//! Input expansion: explicit files or one directory of frames.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

/// File-name pattern selecting every frame in a directory.
pub const DEFAULT_FRAME_PATTERN: &str = "nexrad*.png";

/// Resolve command-line paths into an ordered frame list.
///
/// A single directory expands to the files directly inside it whose names
/// match `pattern` (e.g. `nexrad2017-08-21T14*.png` for one hour), sorted
/// by name, which is chronological. Anything else is used as given, in the
/// given order, and `pattern` is ignored.
pub fn expand_inputs(paths: &[PathBuf], pattern: &str) -> Result<Vec<PathBuf>> {
    match paths {
        [] => bail!("no input paths given"),
        [dir] if dir.is_dir() => {
            let pattern = Pattern::new(pattern)
                .with_context(|| format!("Invalid file pattern '{}'", pattern))?;
            let files = frames_in_dir(dir, &pattern)?;
            if files.is_empty() {
                bail!("did not find {} files in {}", pattern, dir.display());
            }
            Ok(files)
        }
        _ => Ok(paths.to_vec()),
    }
}

fn frames_in_dir(dir: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && pattern.matches(entry.file_name().to_string_lossy().as_ref()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_pattern() {
        let pattern = Pattern::new(DEFAULT_FRAME_PATTERN).unwrap();
        assert!(pattern.matches("nexrad2018-01-01T00:00:00.png"));
        assert!(!pattern.matches("map2018-01-01T00:00:00.png"));
        assert!(!pattern.matches("nexrad2018-01-01T00:00:00.png.partial"));
    }

    #[test]
    fn test_directory_expansion_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "nexrad2018-01-01T00:10:00.png",
            "nexrad2018-01-01T00:00:00.png",
            "nexrad2018-01-01T00:05:00.png",
            "notes.txt",
            "keo-lat45-a-b.png",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nexrad-sub.png")).unwrap();

        let files = expand_inputs(&[dir.path().to_path_buf()], DEFAULT_FRAME_PATTERN).unwrap();
        assert_eq!(
            names(&files),
            vec![
                "nexrad2018-01-01T00:00:00.png",
                "nexrad2018-01-01T00:05:00.png",
                "nexrad2018-01-01T00:10:00.png",
            ]
        );
    }

    #[test]
    fn test_pattern_selects_time_window() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "nexrad2017-08-21T15:00:00.png",
            "nexrad2017-08-21T14:55:00.png",
            "nexrad2017-08-21T13:55:00.png",
            "nexrad2017-08-21T14:00:00.png",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = expand_inputs(&[dir.path().to_path_buf()], "nexrad2017-08-21T14*.png").unwrap();
        assert_eq!(
            names(&files),
            vec!["nexrad2017-08-21T14:00:00.png", "nexrad2017-08-21T14:55:00.png"]
        );
    }

    #[test]
    fn test_pattern_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nexrad2017-08-21T14:00:00.png"), b"x").unwrap();
        assert!(expand_inputs(&[dir.path().to_path_buf()], "nexrad2018*.png").is_err());
    }

    #[test]
    fn test_malformed_pattern() {
        let dir = tempfile::tempdir().unwrap();
        assert!(expand_inputs(&[dir.path().to_path_buf()], "nexrad[*.png").is_err());
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(expand_inputs(&[dir.path().to_path_buf()], DEFAULT_FRAME_PATTERN).is_err());
    }

    #[test]
    fn test_explicit_files_keep_order() {
        let given = vec![PathBuf::from("b.png"), PathBuf::from("a.png")];
        assert_eq!(expand_inputs(&given, "nothing*").unwrap(), given);
    }
}
