//! Error types for NEXRAD composite processing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using NexradError.
pub type NexradResult<T> = Result<T, NexradError>;

/// Primary error type for frame, mesh and keogram operations.
#[derive(Debug, Error)]
pub enum NexradError {
    // === Input Errors ===
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unexpected raster format in {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error("Invalid world file {source_name}: {message}")]
    Configuration { source_name: String, message: String },

    #[error("Cannot parse timestamp from '{input}': {message}")]
    Parse { input: String, message: String },

    // === Capability Errors ===
    #[error("Missing capability: {0}")]
    Dependency(String),

    // === Request Errors ===
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "No {axis} coordinate within {tolerance} deg of {value} in {} (nearest {nearest})",
        path.display()
    )]
    OutOfTolerance {
        path: PathBuf,
        axis: &'static str,
        value: f64,
        nearest: f64,
        tolerance: f64,
    },

    // === Infrastructure Errors ===
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NexradError {
    /// Create a Format error.
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a Configuration error.
    pub fn configuration(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a Parse error.
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create an Io error tagged with the path being accessed.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NexradError::NotFound(_) => "not_found",
            NexradError::Format { .. } => "format",
            NexradError::Configuration { .. } => "configuration",
            NexradError::Parse { .. } => "parse",
            NexradError::Dependency(_) => "dependency",
            NexradError::InvalidArgument(_) => "invalid_argument",
            NexradError::OutOfTolerance { .. } => "out_of_tolerance",
            NexradError::Io { .. } => "io",
        }
    }
}
