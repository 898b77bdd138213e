//! Frame loader tests on synthetic composites.
//!
//! Every frame here is a small generated PNG georeferenced by the `SMALL`
//! world file fixture (45N to 44N, 100W to 98W).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use frame_processor::{FrameLoader, LoadOptions, RasterData, SampleType};
use georef::{MeshBuilder, WorldFileSource};
use nexrad_common::NexradError;
use test_utils::{
    create_echo_band_rgb, create_pattern_rgb, pattern_pixel, world, write_gray_png,
    write_pattern_frame, write_rgb16_png, write_rgb_png, write_rgba_png, write_world_file,
};

const ROWS: usize = 20;
const COLS: usize = 40;

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn small_options(dir: &Path) -> LoadOptions {
    let wld = write_world_file(dir, "small.wld", world::SMALL);
    LoadOptions::default().with_world_file(WorldFileSource::File(wld))
}

fn frame_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

// =============================================================================
// Basic loading
// =============================================================================

#[test]
fn test_rgb_frame_shape_and_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pattern_frame(dir.path(), t0(), ROWS, COLS);

    let frame = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap();

    assert_eq!(frame.data.dim(), (ROWS, COLS, 3));
    assert_eq!(frame.data.sample_type(), SampleType::U8);
    assert_eq!(frame.mesh.shape(), (ROWS, COLS));
    assert_eq!(frame.mesh.lat[0], 45.0);
    assert_eq!(frame.mesh.lat[ROWS - 1], 44.0);
    assert_eq!(frame.mesh.lon[0], -100.0);
    assert_eq!(frame.mesh.lon[COLS - 1], -98.0);
    assert_eq!(frame.time(), t0());
    assert!(frame.metadata.filename.starts_with("nexrad2018-01-01T00"));
}

#[test]
fn test_pixels_keep_their_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pattern_frame(dir.path(), t0(), ROWS, COLS);

    let frame = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap();
    let data = frame.data.as_u8().unwrap();

    for (r, c) in [(0, 0), (3, 7), (19, 39), (10, 25)] {
        let px = [data[[r, c, 0]], data[[r, c, 1]], data[[r, c, 2]]];
        assert_eq!(px, pattern_pixel(r, c), "pixel ({}, {})", r, c);
    }
}

#[test]
fn test_bundled_world_file_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pattern_frame(dir.path(), t0(), 54, 122);

    let frame = FrameLoader::default()
        .load(&path, &LoadOptions::default())
        .unwrap();

    assert_eq!(frame.metadata.world_file, WorldFileSource::Bundled);
    assert_eq!(frame.mesh.lat[0], 50.0);
    assert_eq!(frame.mesh.lon[0], -126.0);
}

// =============================================================================
// No-signal recoding and alpha
// =============================================================================

#[test]
fn test_single_black_pixel_becomes_white() {
    let dir = tempfile::tempdir().unwrap();
    let path = frame_path(dir.path(), "nexrad2018-01-01T00:05:00.png");
    let mut pixels = create_pattern_rgb(ROWS, COLS);
    let offset = (2 * COLS + 3) * 3;
    pixels[offset..offset + 3].copy_from_slice(&[0, 0, 0]);
    write_rgb_png(&path, ROWS, COLS, pixels);

    let frame = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap();
    let data = frame.data.as_u8().unwrap();

    assert_eq!([data[[2, 3, 0]], data[[2, 3, 1]], data[[2, 3, 2]]], [255, 255, 255]);
    for (r, c) in [(2, 2), (2, 4), (1, 3), (3, 3)] {
        let px = [data[[r, c, 0]], data[[r, c, 1]], data[[r, c, 2]]];
        assert_eq!(px, pattern_pixel(r, c));
    }
}

#[test]
fn test_rgba_alpha_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = frame_path(dir.path(), "nexrad2018-01-01T00:10:00.png");
    write_rgba_png(&path, ROWS, COLS, &create_echo_band_rgb(ROWS, COLS), 255);

    let frame = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap();
    let data = frame.data.as_u8().unwrap();

    assert_eq!(data.dim(), (ROWS, COLS, 3));
    // background rows are no-echo and must now be white
    assert_eq!([data[[0, 0, 0]], data[[0, 0, 1]], data[[0, 0, 2]]], [255, 255, 255]);
    assert!(data
        .lanes(ndarray::Axis(2))
        .into_iter()
        .all(|px| px.iter().any(|&v| v != 0)));
}

#[test]
fn test_keep_alpha_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = frame_path(dir.path(), "nexrad2018-01-01T00:10:00.png");
    write_rgba_png(&path, ROWS, COLS, &create_echo_band_rgb(ROWS, COLS), 200);

    let frame = FrameLoader::default()
        .load(&path, &small_options(dir.path()).with_keep_alpha(true))
        .unwrap();
    let data = frame.data.as_u8().unwrap();

    assert_eq!(data.dim(), (ROWS, COLS, 4));
    assert_eq!(data[[0, 0, 0]], 0);
    assert_eq!(data[[0, 0, 3]], 200);
}

#[test]
fn test_sixteen_bit_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = frame_path(dir.path(), "nexrad2018-01-01T00:15:00.png");
    write_rgb16_png(&path, ROWS, COLS, &create_echo_band_rgb(ROWS, COLS));

    let frame = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap();

    assert_eq!(frame.data.sample_type(), SampleType::U16);
    let data = frame.data.as_u16().unwrap();
    assert_eq!(data[[0, 0, 0]], u16::MAX);
    assert_eq!(data[[ROWS / 2, 0, 0]], 4 * 257);
}

// =============================================================================
// Downsampling
// =============================================================================

#[test]
fn test_downsample_shape_and_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pattern_frame(dir.path(), t0(), ROWS, COLS);

    let frame = FrameLoader::default()
        .load(&path, &small_options(dir.path()).with_downsample(Some(4)))
        .unwrap();

    assert_eq!(frame.data.dim(), (ROWS / 4, COLS / 4, 3));
    assert_eq!(frame.mesh.shape(), (ROWS / 4, COLS / 4));
    // same footprint at the coarser resolution
    assert_eq!(frame.mesh.lat[0], 45.0);
    assert_eq!(frame.mesh.lat[ROWS / 4 - 1], 44.0);
}

#[test]
fn test_downsample_without_resampler() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pattern_frame(dir.path(), t0(), ROWS, COLS);
    let loader = FrameLoader::without_resampler(MeshBuilder::new());

    let err = loader
        .load(&path, &small_options(dir.path()).with_downsample(Some(2)))
        .unwrap_err();
    assert!(matches!(err, NexradError::Dependency(_)));

    // a plain load needs no resampler
    assert!(loader.load(&path, &small_options(dir.path())).is_ok());
}

#[test]
fn test_downsample_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pattern_frame(dir.path(), t0(), ROWS, COLS);

    let err = FrameLoader::default()
        .load(&path, &small_options(dir.path()).with_downsample(Some(0)))
        .unwrap_err();
    assert!(matches!(err, NexradError::InvalidArgument(_)));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_grayscale_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = frame_path(dir.path(), "nexrad2018-01-01T00:20:00.png");
    write_gray_png(&path, ROWS, COLS);

    let err = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap_err();
    assert!(matches!(err, NexradError::Format { .. }), "got {:?}", err);
}

#[test]
fn test_undecodable_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = frame_path(dir.path(), "nexrad2018-01-01T00:25:00.png");
    std::fs::write(&path, b"<html>404 Not Found</html>").unwrap();

    let err = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap_err();
    assert!(matches!(err, NexradError::Format { .. }), "got {:?}", err);
}

#[test]
fn test_nonconforming_filename() {
    let dir = tempfile::tempdir().unwrap();
    let path = frame_path(dir.path(), "radar.png");
    write_rgb_png(&path, ROWS, COLS, create_pattern_rgb(ROWS, COLS));

    let err = FrameLoader::default()
        .load(&path, &small_options(dir.path()))
        .unwrap_err();
    assert!(matches!(err, NexradError::Parse { .. }));
}

#[test]
fn test_missing_world_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pattern_frame(dir.path(), t0(), ROWS, COLS);
    let options = LoadOptions::default()
        .with_world_file(WorldFileSource::File(dir.path().join("absent.wld")));

    let err = FrameLoader::default().load(&path, &options).unwrap_err();
    assert!(matches!(err, NexradError::Configuration { .. }));
}

// =============================================================================
// Mesh sharing
// =============================================================================

#[test]
fn test_frames_share_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_pattern_frame(dir.path(), t0(), ROWS, COLS);
    let b = write_pattern_frame(dir.path(), t0() + chrono::Duration::minutes(5), ROWS, COLS);
    let options = small_options(dir.path());
    let loader = FrameLoader::default();

    let fa = loader.load(&a, &options).unwrap();
    let fb = loader.load(&b, &options).unwrap();

    assert!(Arc::ptr_eq(&fa.mesh, &fb.mesh));
    assert_eq!(loader.meshes().cache().stats().misses, 1);
    assert!(matches!(fb.data, RasterData::U8(_)));
}
