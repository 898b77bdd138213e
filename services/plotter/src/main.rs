//! NEXRAD composite plotter.
//!
//! Exports georeferenced frames and keograms as PNG rasters with JSON
//! coordinate sidecars:
//! - Frame mode: one `map<time>.png` per input frame
//! - Keogram mode (`--keo lat 45`): one `keo-...png` for the whole sequence
//! - Without `--odir` products are only summarized in the log

mod inputs;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use frame_processor::{Cut, FrameLoader, KeogramBuilder, LoadOptions};
use georef::WorldFileSource;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "plot-nexrad")]
#[command(about = "Export NEXRAD composite frames and keograms")]
struct Args {
    /// Frame files, or a single directory of frames
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// File-name glob selecting frames when a directory is given
    #[arg(long, default_value = inputs::DEFAULT_FRAME_PATTERN)]
    pat: String,

    /// Build a keogram cut at a latitude or longitude, e.g. `--keo lat 45`
    #[arg(long, num_args = 2, value_names = ["AXIS", "VALUE"], allow_negative_numbers = true)]
    keo: Option<Vec<String>>,

    /// Directory to write products into
    #[arg(long, env = "NEXRAD_PLOT_DIR")]
    odir: Option<PathBuf>,

    /// World file (default: bundled n0q.wld)
    #[arg(long)]
    wld: Option<PathBuf>,

    /// Shrink frames by this integer factor
    #[arg(long)]
    downsample: Option<usize>,

    /// Keep the alpha channel and black no-signal pixels
    #[arg(long)]
    keep_alpha: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_world_file(WorldFileSource::from_option(self.wld.as_deref()))
            .with_downsample(self.downsample)
            .with_keep_alpha(self.keep_alpha)
    }
}

/// Outcome of frame mode.
#[derive(Debug, Default)]
struct FrameReport {
    written: Vec<PathBuf>,
    loaded: usize,
    failed: usize,
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

/// Load every frame, writing each one that succeeds. Load and write
/// failures are logged and counted; the rest of the list is still processed.
fn run_frames(
    loader: &FrameLoader,
    files: &[PathBuf],
    options: &LoadOptions,
    odir: Option<&Path>,
) -> FrameReport {
    let mut report = FrameReport::default();

    for path in files {
        let frame = match loader.load(path, options) {
            Ok(frame) => frame,
            Err(e) => {
                error!(path = %path.display(), kind = e.kind(), error = %e, "Failed to load frame");
                report.failed += 1;
                continue;
            }
        };
        report.loaded += 1;

        let (rows, cols) = frame.shape();
        match odir {
            Some(dir) => match render::write_frame(&frame, dir) {
                Ok(out) => {
                    info!(source = %path.display(), output = %out.display(), "Wrote frame");
                    report.written.push(out);
                }
                Err(e) => {
                    error!(path = %path.display(), error = %format!("{:#}", e), "Failed to write frame");
                    report.failed += 1;
                }
            },
            None => info!(
                source = %path.display(),
                time = %frame.time(),
                rows,
                cols,
                channels = frame.data.channels(),
                "Loaded frame"
            ),
        }
    }

    report
}

/// Build a keogram; any failing frame aborts.
fn run_keogram(
    loader: FrameLoader,
    files: &[PathBuf],
    options: LoadOptions,
    keo: &[String],
    odir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let [axis, value] = keo else {
        bail!("--keo takes exactly two values: AXIS VALUE");
    };
    let cut = Cut::parse(axis, value).context("Invalid keogram cut")?;

    let keogram = KeogramBuilder::new(loader, options)
        .build(files, cut)
        .context("Failed to build keogram")?;
    let (space, time, channels) = keogram.dim();

    match odir {
        Some(dir) => {
            let stem = render::keogram_stem(cut.axis, value, files);
            let out = render::write_keogram(&keogram, &stem, files, dir)?;
            info!(output = %out.display(), space, time, "Keogram created");
            Ok(Some(out))
        }
        None => {
            info!(cut = %cut, space, time, channels, "Built keogram");
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let files = inputs::expand_inputs(&args.paths, &args.pat)?;
    if let Some(dir) = &args.odir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let loader = FrameLoader::default();
    let options = args.load_options();
    info!(frames = files.len(), "Starting NEXRAD plot");

    match &args.keo {
        Some(keo) => {
            run_keogram(loader, &files, options, keo, args.odir.as_deref())?;
        }
        None => {
            let report = run_frames(&loader, &files, &options, args.odir.as_deref());
            let stats = loader.meshes().cache().stats();
            info!(
                loaded = report.loaded,
                written = report.written.len(),
                failed = report.failed,
                mesh_hits = stats.hits,
                mesh_misses = stats.misses,
                "Plot session complete"
            );
            if report.failed > 0 {
                bail!("{} of {} frames failed", report.failed, files.len());
            }
        }
    }

    Ok(())
}
