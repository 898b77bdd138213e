//! Single-attempt composite fetching with no-clobber semantics.
//!
//! Key features:
//! - Deterministic local filename per timestamp, existing frames skipped
//! - HEAD probe so archive gaps are reported, not treated as failures
//! - Streamed body written to `<name>.partial` and renamed into place
//! - Bounded worker pool for a whole time grid

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use futures::{stream, StreamExt};
use reqwest::{header, Client, Response, StatusCode};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

use nexrad_common::{archive_url, local_filename, FilenameStyle};

use crate::config::ArchiveConfig;

/// Settings for a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    /// Timeout applied to each HEAD and GET separately
    pub request_timeout: Duration,
    /// No-clobber threshold
    pub min_existing_bytes: u64,
    /// Fetch even when a complete-looking file exists
    pub overwrite: bool,
    pub filename_style: FilenameStyle,
}

impl From<&ArchiveConfig> for FetchConfig {
    fn from(config: &ArchiveConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            min_existing_bytes: config.min_existing_bytes,
            overwrite: false,
            filename_style: config.filename_style,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&ArchiveConfig::default())
    }
}

/// What happened to one timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already on disk; no request was made
    Skipped { path: PathBuf },
    Downloaded { path: PathBuf, bytes: u64 },
    /// The archive has no frame for this time
    Missing { url: String, status: u16 },
}

/// Totals for a batch of fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl FetchSummary {
    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Skipped { .. } => self.skipped += 1,
            FetchOutcome::Downloaded { bytes, .. } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            FetchOutcome::Missing { .. } => self.missing += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.missing + self.failed
    }
}

/// Fetches composites from the archive into a local directory.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn url_for(&self, t: NaiveDateTime) -> String {
        archive_url(&self.config.base_url, t)
    }

    pub fn target_path(&self, t: NaiveDateTime, outdir: &Path) -> PathBuf {
        outdir.join(local_filename(t, self.config.filename_style))
    }

    /// Fetch the frame valid at `t` into `outdir`. One attempt, no retry.
    #[instrument(skip_all, fields(time = %t))]
    pub async fn fetch(&self, t: NaiveDateTime, outdir: &Path) -> Result<FetchOutcome> {
        let path = self.target_path(t, outdir);

        if !self.config.overwrite && self.is_complete(&path).await {
            info!(path = %path.display(), "SKIPPED: frame already present");
            return Ok(FetchOutcome::Skipped { path });
        }

        let url = self.url_for(t);
        let head = self
            .client
            .head(&url)
            .send()
            .await
            .with_context(|| format!("HEAD request failed: {}", url))?;

        if head.status() != StatusCode::OK {
            error!(url = %url, status = head.status().as_u16(), "Frame not found in archive");
            return Ok(FetchOutcome::Missing {
                url,
                status: head.status().as_u16(),
            });
        }

        let size = content_length(&head);
        info!(
            file = %path.display(),
            mbytes = ?size.map(|b| b / 1_000_000),
            "Downloading"
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("GET request rejected: {}", url))?;

        fs::create_dir_all(outdir)
            .await
            .with_context(|| format!("Failed to create {}", outdir.display()))?;

        let partial = partial_path(&path);
        let bytes = stream_to_file(response, &partial).await?;

        if let Some(expected) = size {
            if expected != bytes {
                warn!(expected, actual = bytes, "Download size differs from HEAD");
            }
        }

        fs::rename(&partial, &path)
            .await
            .with_context(|| format!("Failed to move {} into place", partial.display()))?;

        info!(path = %path.display(), bytes, "Download completed");
        Ok(FetchOutcome::Downloaded { path, bytes })
    }

    /// Fetch every timestamp on a pool of `max_concurrent` workers.
    ///
    /// Each fetch fails on its own; siblings keep running.
    pub async fn fetch_all(
        &self,
        times: &[NaiveDateTime],
        outdir: &Path,
        max_concurrent: usize,
    ) -> FetchSummary {
        let results = stream::iter(times.iter().copied())
            .map(|t| async move { (t, self.fetch(t, outdir).await) })
            .buffer_unordered(max_concurrent.max(1))
            .collect::<Vec<_>>()
            .await;

        let mut summary = FetchSummary::default();
        for (t, result) in results {
            match result {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!(time = %t, error = %format!("{:#}", e), "Fetch failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    async fn is_complete(&self, path: &Path) -> bool {
        match fs::metadata(path).await {
            Ok(meta) => meta.is_file() && meta.len() >= self.config.min_existing_bytes,
            Err(_) => false,
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn content_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

/// Stream a response body to `path`, returning the byte count.
///
/// A failure midway leaves the partial file behind.
async fn stream_to_file(response: Response, path: &Path) -> Result<u64> {
    let mut file = fs::File::create(path)
        .await
        .with_context(|| format!("Failed to open output file {}", path.display()))?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Error reading response chunk")?;
        file.write_all(&chunk)
            .await
            .context("Error writing to file")?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    debug!(path = %path.display(), written, "Body written");

    Ok(written)
}
