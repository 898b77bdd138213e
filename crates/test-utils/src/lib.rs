//! Shared test utilities for the NEXRAD composite workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Test data path helpers
//! - Skip macros for the large archive frames that are not committed
//! - Synthetic raster and world-file writers
//! - Common fixtures (world files, archive timestamps)
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{require_test_file, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro to skip a test if the required file is not found.
///
/// Real archive frames are ~1 MB each and are fetched with `download-nexrad`
/// rather than committed.
///
/// ```ignore
/// #[test]
/// fn test_archive_frame() {
///     let path = require_test_file!("nexrad2018-01-01T00:00:00.png");
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Run download-nexrad or set NEXRAD_TEST_DATA.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Skip unless any one of several equivalent files exists.
///
/// Used for frames whose name depends on the platform filename style.
#[macro_export]
macro_rules! require_any_test_file {
    ($($name:expr),+ $(,)?) => {{
        let mut found = None;
        $(
            if found.is_none() {
                found = $crate::find_test_file($name);
            }
        )+
        match found {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: none of the test files {:?} found.", [$($name),+]);
                return;
            }
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// ```ignore
/// assert_approx_eq!(45.003_f64, 45.0_f64, 0.1_f64); // passes
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
