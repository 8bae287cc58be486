//! Frame sampling.
//!
//! The sampler decodes a [`VideoSource`] front to back and keeps every
//! `stride`-th frame plus the final one, stopping as soon as the grid is
//! full. The stride is derived from the reported frame count so that a
//! video of any length spreads roughly evenly across the grid:
//!
//! ```text
//! stride = max(1, (total_frames - 1) / (count - 1))
//! ```
//!
//! Captured frames come out oldest first from [`capture`]. [`sample`]
//! additionally applies [`SampledSequence::reversed`], which puts the latest
//! captured frame at sequence position 0. Combined with the compositor's
//! bottom-up placement this makes the storyboard read as a rising timeline.

use std::sync::Arc;

use crate::error::GridError;
use crate::progress::{NoOpProgress, Phase, ProgressCallback, ProgressTracker};
use crate::source::{Frame, VideoSource};

/// Frame-index step between captured frames.
///
/// Returns 1 when `count` is 0 or 1, or when the video is shorter than the
/// grid.
///
/// ```
/// use looking_glass::sampler::sampling_stride;
///
/// assert_eq!(sampling_stride(67, 66), 1);
/// assert_eq!(sampling_stride(1000, 66), 15);
/// assert_eq!(sampling_stride(500, 1), 1);
/// ```
pub fn sampling_stride(total_frames: i64, count: usize) -> u64 {
    if total_frames <= 1 || count <= 1 {
        return 1;
    }
    let step = (total_frames - 1) as u64 / (count as u64 - 1);
    step.max(1)
}

/// Whether the frame at `index` is captured.
///
/// True on stride boundaries and for the last frame the container reports.
pub fn should_capture(index: u64, stride: u64, total_frames: i64) -> bool {
    index % stride.max(1) == 0 || (total_frames > 0 && index == (total_frames - 1) as u64)
}

/// An ordered run of sampled frames.
///
/// Each frame carries the source frame index it was decoded at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledSequence {
    frames: Vec<Frame>,
    indices: Vec<u64>,
    total_frames: i64,
}

impl SampledSequence {
    /// Build a sequence from frames and their source indices.
    ///
    /// Extra entries in the longer of the two vectors are dropped.
    pub fn new(frames: Vec<Frame>, indices: Vec<u64>, total_frames: i64) -> Self {
        let len = frames.len().min(indices.len());
        let mut frames = frames;
        let mut indices = indices;
        frames.truncate(len);
        indices.truncate(len);
        Self {
            frames,
            indices,
            total_frames,
        }
    }

    /// An empty sequence for a source that reported `total_frames`.
    pub fn empty(total_frames: i64) -> Self {
        Self {
            total_frames,
            ..Self::default()
        }
    }

    /// Reverse the sequence order.
    ///
    /// Applied once after capture so the latest captured frame is placed
    /// first.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.frames.reverse();
        self.indices.reverse();
        self
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frames were captured.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in sequence order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Source frame index of each frame, in sequence order.
    pub fn indices(&self) -> &[u64] {
        &self.indices
    }

    /// Frame count the source reported when sampling began.
    pub fn total_frames(&self) -> i64 {
        self.total_frames
    }

    /// Iterate over `(source_index, frame)` pairs in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Frame)> {
        self.indices.iter().copied().zip(self.frames.iter())
    }

    /// Consume the sequence, returning its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

/// Capture up to `count` frames in decode order and close the source.
///
/// The source is closed on every exit path, including decode errors.
///
/// # Errors
///
/// Propagates any error from [`VideoSource::read_frame`].
pub fn capture<S: VideoSource + ?Sized>(
    source: &mut S,
    count: usize,
    progress: Arc<dyn ProgressCallback>,
) -> Result<SampledSequence, GridError> {
    let result = capture_frames(source, count, progress);
    source.close();
    result
}

/// Sample `count` frames and reverse them for layout.
///
/// Equivalent to [`capture`] followed by [`SampledSequence::reversed`].
///
/// # Errors
///
/// Propagates any error from [`VideoSource::read_frame`].
///
/// # Example
///
/// ```
/// use image::RgbImage;
/// use looking_glass::{FrameSequence, sampler};
///
/// let mut source = FrameSequence::new(vec![RgbImage::new(8, 8); 10]);
/// let sequence = sampler::sample(&mut source, 4).unwrap();
/// assert_eq!(sequence.indices(), &[9, 6, 3, 0]);
/// assert!(source.is_closed());
/// ```
pub fn sample<S: VideoSource + ?Sized>(
    source: &mut S,
    count: usize,
) -> Result<SampledSequence, GridError> {
    sample_with_progress(source, count, Arc::new(NoOpProgress))
}

/// Like [`sample`] but reports decode progress.
pub fn sample_with_progress<S: VideoSource + ?Sized>(
    source: &mut S,
    count: usize,
    progress: Arc<dyn ProgressCallback>,
) -> Result<SampledSequence, GridError> {
    Ok(capture(source, count, progress)?.reversed())
}

fn capture_frames<S: VideoSource + ?Sized>(
    source: &mut S,
    count: usize,
    progress: Arc<dyn ProgressCallback>,
) -> Result<SampledSequence, GridError> {
    let total_frames = source.frame_count();
    if total_frames <= 0 || count == 0 {
        log::debug!("Nothing to sample (total_frames={total_frames}, count={count})");
        return Ok(SampledSequence::empty(total_frames));
    }

    let stride = sampling_stride(total_frames, count);
    log::debug!("Sampling {count} frames from {total_frames} with stride {stride}");

    let mut tracker = ProgressTracker::new(
        progress,
        Phase::Sampling,
        Some(total_frames as u64),
    );
    let mut frames = Vec::with_capacity(count);
    let mut indices = Vec::with_capacity(count);
    let mut index: u64 = 0;

    while frames.len() < count {
        let Some(frame) = source.read_frame()? else {
            break;
        };
        if should_capture(index, stride, total_frames) {
            frames.push(frame);
            indices.push(index);
        }
        tracker.advance(Some(index));
        index += 1;
    }
    tracker.finish();

    log::debug!(
        "Captured {} of {count} frames after decoding {index}",
        frames.len()
    );

    Ok(SampledSequence::new(frames, indices, total_frames))
}
