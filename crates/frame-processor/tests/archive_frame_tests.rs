//! End-to-end checks against a real archive composite.
//!
//! The frame is not committed. Fetch it with
//! `download-nexrad 2018-01-01T00:00 2018-01-01T00:05 crates/frame-processor/testdata`
//! or point `NEXRAD_TEST_DATA` at a directory holding it; otherwise these
//! tests are skipped.

use chrono::NaiveDateTime;
use frame_processor::{Cut, CutAxis, FrameLoader, KeogramBuilder, LoadOptions, SampleType};
use test_utils::{assert_approx_eq, require_any_test_file, time, world};

fn new_year() -> NaiveDateTime {
    NaiveDateTime::parse_from_str(time::NEW_YEAR_2018, "%Y-%m-%dT%H:%M:%S").unwrap()
}

#[test]
fn test_archive_frame_full_resolution() {
    let path = require_any_test_file!(time::NEW_YEAR_2018_FRAME, time::NEW_YEAR_2018_FRAME_DASHES);

    let frame = FrameLoader::default()
        .load(&path, &LoadOptions::default())
        .unwrap();

    let (rows, cols) = world::N0Q_SHAPE;
    assert_eq!(frame.data.dim(), (rows, cols, 3));
    assert!(matches!(
        frame.data.sample_type(),
        SampleType::U8 | SampleType::U16
    ));
    assert_eq!(frame.time(), new_year());
    assert_eq!(frame.mesh.lat[0], 50.0);
    assert_approx_eq!(frame.mesh.lat[rows - 1], 23.0, 1e-9);
}

#[test]
fn test_archive_frame_downsampled() {
    let path = require_any_test_file!(time::NEW_YEAR_2018_FRAME, time::NEW_YEAR_2018_FRAME_DASHES);

    let frame = FrameLoader::default()
        .load(&path, &LoadOptions::default().with_downsample(Some(4)))
        .unwrap();

    assert_eq!(frame.data.dim(), (1350, 3050, 3));
    assert_eq!(frame.mesh.shape(), (1350, 3050));
}

#[test]
fn test_archive_single_frame_keogram() {
    let path = require_any_test_file!(time::NEW_YEAR_2018_FRAME, time::NEW_YEAR_2018_FRAME_DASHES);

    let keo = KeogramBuilder::new(FrameLoader::default(), LoadOptions::default())
        .build(&[path], Cut::new(CutAxis::Lat, 45.0))
        .unwrap();

    assert_eq!(keo.dim(), (world::N0Q_SHAPE.1, 1, 3));
    assert_eq!(keo.times, vec![new_year()]);
    assert_approx_eq!(keo.matched[0], 45.0, 0.1);
}
