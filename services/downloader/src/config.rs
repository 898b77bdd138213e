//! Archive settings for the downloader.
//!
//! Settings come from an optional YAML file; command-line flags override
//! individual values afterwards.

use std::path::Path;

use anyhow::{bail, Context, Result};
use nexrad_common::{FilenameStyle, DEFAULT_ARCHIVE_BASE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where and how composites are fetched.
///
/// ```yaml
/// base_url: https://mesonet.agron.iastate.edu/archive/data/
/// timestep_minutes: 5
/// request_timeout_secs: 60
/// max_concurrent: 4
/// min_existing_bytes: 10000
/// filename_style: colons
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Archive root; frames live under `<Y>/<m>/<d>/GIS/uscomp/`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Spacing of the time grid. The archive publishes every 5 minutes.
    #[serde(default = "default_timestep")]
    pub timestep_minutes: u32,
    /// Per-request timeout for each HEAD and GET
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Size of the download worker pool
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Existing files at least this large are not fetched again
    #[serde(default = "default_min_existing_bytes")]
    pub min_existing_bytes: u64,
    /// Separator style for local filenames
    #[serde(default)]
    pub filename_style: FilenameStyle,
}

fn default_base_url() -> String {
    DEFAULT_ARCHIVE_BASE.to_string()
}

fn default_timestep() -> u32 {
    5
}

fn default_timeout() -> u64 {
    60
}

fn default_max_concurrent() -> usize {
    4
}

fn default_min_existing_bytes() -> u64 {
    10_000 // a real composite is ~1 MB; anything smaller is an error page or a stub
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timestep_minutes: default_timestep(),
            request_timeout_secs: default_timeout(),
            max_concurrent: default_max_concurrent(),
            min_existing_bytes: default_min_existing_bytes(),
            filename_style: FilenameStyle::default(),
        }
    }
}

impl ArchiveConfig {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ArchiveConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), base_url = %config.base_url, "Loaded archive config");
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timestep_minutes == 0 {
            bail!("timestep_minutes must be positive");
        }
        if self.max_concurrent == 0 {
            bail!("max_concurrent must be positive");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("base_url must be an http(s) URL, got '{}'", self.base_url);
        }
        Ok(())
    }

    pub fn timestep(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.timestep_minutes as i64)
    }
}
