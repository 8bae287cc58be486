//! End-to-end storyboard generation.
//!
//! [`Storyboard`] ties the phases together: validate the grid, open the
//! video, sample, composite, and encode. [`video_to_grid`] is the one-call
//! entry point most callers want.

use std::path::{Path, PathBuf};

use crate::compositor::{self, Canvas};
use crate::config::{EmptyVideoPolicy, GridOptions};
use crate::encode;
use crate::error::GridError;
use crate::grid::GridSpec;
use crate::progress::{Phase, ProgressTracker};
use crate::sampler;
use crate::source::{MediaFile, VideoSource};

/// Summary of one storyboard run.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct StoryboardReport {
    /// Frame count the source reported.
    pub total_frames: i64,
    /// Frame rate the source reported.
    pub frames_per_second: f64,
    /// Source frame index of every placed frame, in placement order.
    pub frame_indices: Vec<u64>,
    /// The grid that was rendered.
    pub grid: GridSpec,
    /// Where the image was written, if it was written.
    pub output_path: Option<PathBuf>,
}

impl StoryboardReport {
    /// Number of cells that received a frame.
    pub fn filled_cells(&self) -> usize {
        self.frame_indices.len().min(self.grid.capacity())
    }
}

/// Storyboard generation entry points.
///
/// All methods are stateless.
///
/// # Example
///
/// ```no_run
/// use looking_glass::{GridError, GridOptions, GridSpec, Storyboard};
///
/// let options = GridOptions::new().with_grid(GridSpec::new(5, 4));
/// let (canvas, report) = Storyboard::render("input.mp4", &options)?;
/// println!("filled {} of {} cells", report.filled_cells(), report.grid.capacity());
/// canvas.save("storyboard.png")?;
/// # Ok::<(), GridError>(())
/// ```
pub struct Storyboard;

impl Storyboard {
    /// Render a canvas from any [`VideoSource`].
    ///
    /// The source is closed before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidGridSpec`] before reading anything if the
    /// grid is invalid, decode errors from the source, and
    /// [`GridError::EmptyVideo`] when no frames were captured under
    /// [`EmptyVideoPolicy::Error`].
    pub fn render_source<S: VideoSource + ?Sized>(
        source: &mut S,
        options: &GridOptions,
    ) -> Result<(Canvas, StoryboardReport), GridError> {
        let grid = options.grid;
        if let Err(error) = grid.validate() {
            source.close();
            return Err(error);
        }

        let frames_per_second = source.frames_per_second();
        let sequence =
            sampler::sample_with_progress(source, grid.capacity(), options.progress.clone())?;

        if sequence.is_empty() {
            match options.empty_policy {
                EmptyVideoPolicy::Blank => log::warn!(
                    "No frames captured (source reported {}); producing a blank canvas",
                    sequence.total_frames()
                ),
                EmptyVideoPolicy::Error => {
                    return Err(GridError::EmptyVideo {
                        total_frames: sequence.total_frames(),
                    });
                }
            }
        }

        let canvas =
            compositor::compose_with(&sequence, &grid, options.filter, options.progress.clone())?;

        let report = StoryboardReport {
            total_frames: sequence.total_frames(),
            frames_per_second,
            frame_indices: sequence.indices().to_vec(),
            grid,
            output_path: None,
        };
        Ok((canvas, report))
    }

    /// Open a video file and render its canvas.
    ///
    /// The grid is validated before the file is touched.
    ///
    /// # Errors
    ///
    /// As [`render_source`](Storyboard::render_source), plus
    /// [`GridError::FileOpen`] / [`GridError::NoVideoStream`] if the input
    /// cannot be opened as a video.
    pub fn render<P: AsRef<Path>>(
        input: P,
        options: &GridOptions,
    ) -> Result<(Canvas, StoryboardReport), GridError> {
        options.grid.validate()?;
        let mut source = MediaFile::open(input)?;
        Self::render_source(&mut source, options)
    }

    /// Render a video file and write the image to `output`.
    ///
    /// Creates the output directory if needed and overwrites any existing
    /// file.
    ///
    /// # Errors
    ///
    /// As [`render`](Storyboard::render), plus [`GridError::OutputWrite`]
    /// if the image cannot be written.
    pub fn write<P: AsRef<Path>, Q: AsRef<Path>>(
        input: P,
        output: Q,
        options: &GridOptions,
    ) -> Result<StoryboardReport, GridError> {
        let output = output.as_ref();
        let (canvas, mut report) = Self::render(input, options)?;

        let mut tracker =
            ProgressTracker::new(options.progress.clone(), Phase::Encoding, Some(1));
        encode::save_canvas(&canvas, output, options.jpeg_quality)?;
        tracker.advance(None);

        log::info!("Grid image saved to {}", output.display());
        report.output_path = Some(output.to_path_buf());
        Ok(report)
    }
}

/// Turn the video at `input` into a grid image at `output`.
///
/// Uses the default empty-video policy (blank canvas), bilinear resampling,
/// and JPEG quality 90 when `output` ends in `.jpg`.
///
/// # Errors
///
/// - [`GridError::InvalidGridSpec`] if `grid` has a zero dimension, raised
///   before the input is opened.
/// - [`GridError::FileOpen`] if `input` is not a decodable video.
/// - [`GridError::OutputWrite`] if `output` cannot be written.
///
/// # Example
///
/// ```no_run
/// use looking_glass::{GridError, GridSpec};
///
/// looking_glass::video_to_grid("vase.mp4", "outputs/vase_qs11x6.jpg", &GridSpec::default())?;
/// # Ok::<(), GridError>(())
/// ```
pub fn video_to_grid<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    grid: &GridSpec,
) -> Result<(), GridError> {
    let options = GridOptions::new().with_grid(*grid);
    Storyboard::write(input, output, &options).map(|_| ())
}

/// Like [`video_to_grid`] with full control over the run.
///
/// # Errors
///
/// As [`Storyboard::write`].
pub fn video_to_grid_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &GridOptions,
) -> Result<StoryboardReport, GridError> {
    Storyboard::write(input, output, options)
}
