//! NEXRAD composite downloader.
//!
//! Fetches the IEM `n0q` US composite PNGs for every archive timestep in a
//! time range:
//! - Deterministic `nexrad<timestamp>.png` filenames
//! - No-clobber: complete frames already on disk are not fetched again
//! - Archive gaps (non-200 HEAD) are logged and counted, not fatal
//! - Bounded worker pool for independent downloads

mod config;
mod download;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use nexrad_common::{parse_timestamp, time_grid};

use config::ArchiveConfig;
use download::{FetchConfig, Fetcher};

#[derive(Parser, Debug)]
#[command(name = "download-nexrad")]
#[command(about = "Download NEXRAD n0q composite frames from the IEM archive")]
struct Args {
    /// First time to download (e.g. 2018-01-01T00:00)
    start: String,

    /// Time to stop at; never itself downloaded
    stop: String,

    /// Directory to write frames into
    #[arg(default_value = ".")]
    outdir: PathBuf,

    /// Minutes between frames (default from config, 5)
    #[arg(long)]
    timestep: Option<u32>,

    /// Maximum concurrent downloads
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Download even if the frame already exists
    #[arg(long)]
    overwrite: bool,

    /// Fetch one frame at a time
    #[arg(long)]
    sequential: bool,

    /// YAML file with archive settings
    #[arg(long, env = "NEXRAD_DOWNLOAD_CONFIG")]
    config: Option<PathBuf>,

    /// Archive root URL
    #[arg(long, env = "NEXRAD_ARCHIVE_URL")]
    base_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// File settings with command-line overrides applied.
    fn archive_config(&self) -> Result<ArchiveConfig> {
        let mut config = ArchiveConfig::load_or_default(self.config.as_deref())?;

        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(step) = self.timestep {
            config.timestep_minutes = step;
        }
        if let Some(n) = self.max_concurrent {
            config.max_concurrent = n;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
        if self.sequential {
            config.max_concurrent = 1;
        }

        config.validate().context("Invalid archive settings")?;
        Ok(config)
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let config = args.archive_config()?;
    let start = parse_timestamp(&args.start).context("Invalid start time")?;
    let stop = parse_timestamp(&args.stop).context("Invalid stop time")?;
    let times = time_grid(start, stop, config.timestep()).context("Invalid time range")?;

    tokio::fs::create_dir_all(&args.outdir)
        .await
        .with_context(|| format!("Failed to create {}", args.outdir.display()))?;

    info!(
        start = %start,
        stop = %stop,
        frames = times.len(),
        outdir = %args.outdir.display(),
        max_concurrent = config.max_concurrent,
        "Starting NEXRAD download"
    );

    let mut fetch_config = FetchConfig::from(&config);
    fetch_config.overwrite = args.overwrite;
    let fetcher = Fetcher::new(fetch_config)?;

    let summary = fetcher
        .fetch_all(&times, &args.outdir, config.max_concurrent)
        .await;

    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        missing = summary.missing,
        failed = summary.failed,
        total_bytes = summary.bytes,
        "Download session complete"
    );

    if summary.failed > 0 {
        bail!("{} of {} downloads failed", summary.failed, summary.total());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "download-nexrad",
            "2018-01-01T00:00",
            "2018-01-01T01:00",
            "/tmp/nexrad",
            "--timestep",
            "10",
            "--max-concurrent",
            "8",
            "--base-url",
            "http://localhost:9000/",
        ]);
        let config = args.archive_config().unwrap();
        assert_eq!(config.timestep_minutes, 10);
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.base_url, "http://localhost:9000/");
        assert_eq!(args.outdir, PathBuf::from("/tmp/nexrad"));
    }

    #[test]
    fn test_sequential_forces_single_worker() {
        let args = Args::parse_from([
            "download-nexrad",
            "2018-01-01",
            "2018-01-02",
            "--max-concurrent",
            "8",
            "--sequential",
        ]);
        assert_eq!(args.archive_config().unwrap().max_concurrent, 1);
        assert_eq!(args.outdir, PathBuf::from("."));
    }

    #[test]
    fn test_zero_timestep_rejected() {
        let args = Args::parse_from(["download-nexrad", "2018-01-01", "2018-01-02", "--timestep", "0"]);
        assert!(args.archive_config().is_err());
    }
}
