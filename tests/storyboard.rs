//! End-to-end storyboard tests.
//!
//! Most tests drive the pipeline with in-memory sources. Tests that need a
//! real video use `tests/fixtures/sample_video.mp4` and return early when it
//! is absent.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use image::{GenericImageView, Rgb, RgbImage};
use looking_glass::{
    EmptyVideoPolicy, FrameSequence, GridError, GridOptions, GridSpec, Phase,
    ProgressCallback, ProgressInfo, Storyboard, encode,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn small_options(columns: u32, rows: u32) -> GridOptions {
    GridOptions::new().with_grid(GridSpec::new(columns, rows).with_canvas_size(columns * 16, rows * 9))
}

fn numbered_frames(count: usize) -> Vec<RgbImage> {
    (0..count)
        .map(|index| RgbImage::from_pixel(32, 18, Rgb([(index * 10 % 256) as u8, 128, 64])))
        .collect()
}

// ── In-memory pipeline ───────────────────────────────────────────

#[test]
fn render_source_reports_placement_order() {
    let mut source = FrameSequence::new(numbered_frames(10));
    let (canvas, report) = Storyboard::render_source(&mut source, &small_options(2, 2)).unwrap();

    assert_eq!(canvas.dimensions(), (32, 18));
    assert_eq!(report.total_frames, 10);
    assert_eq!(report.frame_indices, vec![9, 6, 3, 0]);
    assert_eq!(report.filled_cells(), 4);
    assert!(report.output_path.is_none());
    assert!(source.is_closed());
}

#[test]
fn latest_frame_lands_bottom_left() {
    let mut source = FrameSequence::new(numbered_frames(4));
    let options = GridOptions::new().with_grid(GridSpec::new(2, 2).with_canvas_size(64, 36));
    let (canvas, _) = Storyboard::render_source(&mut source, &options).unwrap();

    // Frame 3 is bottom-left, frame 0 top-right.
    assert_eq!(canvas.get_pixel(0, 35), &Rgb([30, 128, 64]));
    assert_eq!(canvas.get_pixel(63, 0), &Rgb([0, 128, 64]));
}

#[test]
fn invalid_spec_fails_before_any_decode() {
    let mut source = FrameSequence::new(numbered_frames(10));
    let options = GridOptions::new().with_grid(GridSpec::new(0, 6));
    let result = Storyboard::render_source(&mut source, &options);

    assert!(matches!(result, Err(GridError::InvalidGridSpec(_))));
    assert_eq!(source.frames_read(), 0);
    assert!(source.is_closed());
}

#[test]
fn empty_video_gives_blank_canvas_by_default() {
    let mut source = FrameSequence::new(Vec::new());
    let (canvas, report) = Storyboard::render_source(&mut source, &small_options(11, 6)).unwrap();

    assert_eq!(canvas.dimensions(), (176, 54));
    assert!(canvas.pixels().all(|pixel| *pixel == Rgb([0, 0, 0])));
    assert_eq!(report.filled_cells(), 0);
    assert_eq!(report.total_frames, 0);
}

#[test]
fn empty_video_is_an_error_under_strict_policy() {
    let mut source = FrameSequence::new(Vec::new());
    let options = small_options(11, 6).with_empty_policy(EmptyVideoPolicy::Error);
    let result = Storyboard::render_source(&mut source, &options);

    assert!(matches!(result, Err(GridError::EmptyVideo { total_frames: 0 })));
    assert!(source.is_closed());
}

#[test]
fn decode_error_propagates_and_closes_source() {
    let mut source = FrameSequence::new(numbered_frames(10)).with_decode_failure_at(2);
    let result = Storyboard::render_source(&mut source, &small_options(2, 2));

    assert!(matches!(result, Err(GridError::VideoDecodeError(_))));
    assert!(source.is_closed());
}

#[derive(Default)]
struct PhaseRecorder {
    phases: Mutex<Vec<Phase>>,
}

impl ProgressCallback for PhaseRecorder {
    fn on_progress(&self, info: &ProgressInfo) {
        let mut phases = self.phases.lock().unwrap();
        if phases.last() != Some(&info.phase) {
            phases.push(info.phase);
        }
    }
}

#[test]
fn progress_reports_sampling_then_compositing() {
    let recorder = Arc::new(PhaseRecorder::default());
    let options = small_options(2, 2).with_progress(recorder.clone());
    let mut source = FrameSequence::new(numbered_frames(8));
    Storyboard::render_source(&mut source, &options).unwrap();

    assert_eq!(
        *recorder.phases.lock().unwrap(),
        vec![Phase::Sampling, Phase::Compositing]
    );
}

// ── Options ──────────────────────────────────────────────────────

#[test]
fn options_defaults() {
    let options = GridOptions::new();
    assert_eq!(*options.grid(), GridSpec::default());
    assert_eq!(options.empty_policy(), EmptyVideoPolicy::Blank);
    assert_eq!(options.jpeg_quality(), 90);
    let debug = format!("{options:?}");
    assert!(debug.contains("GridOptions"));
}

#[test]
fn jpeg_quality_is_clamped() {
    assert_eq!(GridOptions::new().with_jpeg_quality(0).jpeg_quality(), 1);
    assert_eq!(GridOptions::new().with_jpeg_quality(250).jpeg_quality(), 100);
}

// ── Encoding ─────────────────────────────────────────────────────

#[test]
fn save_canvas_creates_parent_directories() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("outputs").join("nested").join("grid.png");

    let canvas = RgbImage::from_pixel(40, 30, Rgb([12, 34, 56]));
    encode::save_canvas(&canvas, &path, 90).expect("Failed to save canvas");

    let reloaded = image::open(&path).expect("Failed to reopen").to_rgb8();
    assert_eq!(reloaded, canvas);
}

#[test]
fn save_canvas_overwrites_and_encodes_jpeg() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("grid.jpg");
    std::fs::write(&path, b"stale contents").expect("Failed to write stale file");

    let canvas = RgbImage::new(64, 48);
    encode::save_canvas(&canvas, &path, 75).expect("Failed to save canvas");

    let reloaded = image::open(&path).expect("Failed to reopen");
    assert_eq!(reloaded.dimensions(), (64, 48));
}

#[test]
fn save_canvas_rejects_unknown_extension() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("grid.notanimage");

    let result = encode::save_canvas(&RgbImage::new(4, 4), &path, 90);
    assert!(matches!(result, Err(GridError::OutputWrite { .. })));
    assert!(!path.exists());
}

#[test]
fn save_canvas_reports_unwritable_destination() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    // A regular file where a directory is expected.
    let blocker = directory.path().join("blocker");
    std::fs::write(&blocker, b"").expect("Failed to write blocker");

    let result = encode::save_canvas(&RgbImage::new(4, 4), blocker.join("grid.png"), 90);
    let error = result.unwrap_err();
    assert!(
        error.to_string().contains("Failed to write grid image"),
        "{error}"
    );
}

// ── File-based pipeline ──────────────────────────────────────────

#[test]
fn video_to_grid_rejects_invalid_spec_before_opening() {
    // The input does not exist; the grid error must win.
    let result = looking_glass::video_to_grid(
        "this_file_does_not_exist.mp4",
        "unused.jpg",
        &GridSpec::new(0, 6),
    );
    assert!(matches!(result, Err(GridError::InvalidGridSpec(_))));
}

#[test]
fn video_to_grid_reports_missing_input() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("grid.jpg");

    let result = looking_glass::video_to_grid("this_file_does_not_exist.mp4", &output, &GridSpec::default());
    let error = result.unwrap_err();
    assert!(
        error.to_string().contains("Failed to open video"),
        "Error message should mention open failure: {error}"
    );
    assert!(!output.exists());
}

#[test]
fn video_to_grid_rejects_non_video_input() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = directory.path().join("invalid.mp4");
    std::fs::write(&input, b"this is not a media file").expect("Failed to write invalid file");

    let result = looking_glass::video_to_grid(&input, directory.path().join("grid.jpg"), &GridSpec::default());
    assert!(matches!(
        result,
        Err(GridError::FileOpen { .. }) | Err(GridError::NoVideoStream)
    ));
}

#[test]
fn fixture_video_renders_full_canvas() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("out").join("sample_qs4x3.jpg");
    let options = GridOptions::new().with_grid(GridSpec::new(4, 3).with_canvas_size(800, 600));

    let report = looking_glass::video_to_grid_with_options(path, &output, &options)
        .expect("Failed to render fixture");

    assert!(report.filled_cells() > 0);
    assert!(report.frame_indices.len() <= 12);
    assert!(report.frame_indices.windows(2).all(|pair| pair[0] > pair[1]));
    assert_eq!(report.output_path.as_deref(), Some(output.as_path()));

    let image = image::open(&output).expect("Failed to reopen output");
    assert_eq!(image.dimensions(), (800, 600));
}

#[test]
fn fixture_video_metadata_is_readable() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let source = looking_glass::MediaFile::open(path).expect("Failed to open fixture");
    let metadata = source.metadata();
    assert!(metadata.width > 0 && metadata.height > 0);
    assert!(metadata.frames_per_second > 0.0);
    assert!(!source.is_closed());
}
