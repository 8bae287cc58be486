//! Progress reporting.
//!
//! A long video can take far longer to decode than to composite, so each
//! phase of a run reports separately. Attach a [`ProgressCallback`] through
//! [`GridOptions::with_progress`](crate::GridOptions::with_progress).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use looking_glass::{GridError, GridOptions, Phase, ProgressCallback, ProgressInfo};
//!
//! struct Stderr;
//!
//! impl ProgressCallback for Stderr {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if info.phase == Phase::Sampling {
//!             eprint!("\rdecoded {} of {:?}", info.completed, info.expected);
//!         }
//!     }
//! }
//!
//! let options = GridOptions::new().with_progress(Arc::new(Stderr));
//! looking_glass::video_to_grid_with_options("input.mp4", "grid.jpg", &options)?;
//! # Ok::<(), GridError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A stage of storyboard generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Phase {
    /// Decoding the video and keeping the sampled frames.
    Sampling,
    /// Fitting frames into cells on the canvas.
    Compositing,
    /// Writing the canvas to its destination.
    Encoding,
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Stage that emitted this notification.
    pub phase: Phase,
    /// Units finished in this phase: frames decoded, cells placed, files
    /// written.
    pub completed: u64,
    /// Units the phase expects to finish. For sampling this is the frame
    /// count the container reported, which may be wrong.
    pub expected: Option<u64>,
    pub elapsed: Duration,
    /// Source frame index of the unit just finished, when there is one.
    pub frame_index: Option<u64>,
}

impl ProgressInfo {
    /// Completion as a fraction in `0.0..=1.0`, if `expected` is known and
    /// non-zero.
    pub fn fraction(&self) -> Option<f64> {
        match self.expected {
            Some(expected) if expected > 0 => {
                Some(self.completed.min(expected) as f64 / expected as f64)
            }
            _ => None,
        }
    }
}

/// Observer for [`ProgressInfo`] notifications.
///
/// Called synchronously on the thread doing the work.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, info: &ProgressInfo);
}

pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Counts units for one phase and forwards each step to the callback.
pub(crate) struct ProgressTracker {
    sink: Arc<dyn ProgressCallback>,
    phase: Phase,
    expected: Option<u64>,
    completed: u64,
    started: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(sink: Arc<dyn ProgressCallback>, phase: Phase, expected: Option<u64>) -> Self {
        Self {
            sink,
            phase,
            expected,
            completed: 0,
            started: Instant::now(),
        }
    }

    /// One more unit done.
    pub(crate) fn advance(&mut self, frame_index: Option<u64>) {
        self.completed += 1;
        self.emit(frame_index);
    }

    /// Closing notification with the final count.
    pub(crate) fn finish(&mut self) {
        self.emit(None);
    }

    fn emit(&self, frame_index: Option<u64>) {
        self.sink.on_progress(&ProgressInfo {
            phase: self.phase,
            completed: self.completed,
            expected: self.expected,
            elapsed: self.started.elapsed(),
            frame_index,
        });
    }
}
