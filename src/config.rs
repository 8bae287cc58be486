//! Storyboard configuration.
//!
//! [`GridOptions`] bundles the grid layout with the operational knobs that
//! do not belong in every function signature: the empty-video policy, the
//! resampling filter, the JPEG quality, and an optional progress callback.
//!
//! # Example
//!
//! ```
//! use looking_glass::{EmptyVideoPolicy, GridOptions, GridSpec, ResizeFilter};
//!
//! let options = GridOptions::new()
//!     .with_grid(GridSpec::new(8, 4).with_canvas_size(2048, 1024))
//!     .with_empty_policy(EmptyVideoPolicy::Error)
//!     .with_filter(ResizeFilter::Lanczos3)
//!     .with_jpeg_quality(85);
//! assert_eq!(options.grid().capacity(), 32);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use image::imageops::FilterType;

use crate::grid::GridSpec;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Default JPEG quality for encoded storyboards.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// What to do when a video yields no frames at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyVideoPolicy {
    /// Log a warning and produce an all-black canvas. This is the default.
    #[default]
    Blank,
    /// Fail with [`GridError::EmptyVideo`](crate::GridError::EmptyVideo).
    Error,
}

/// Resampling filter used when scaling frames into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest neighbour. Fastest, blocky.
    Nearest,
    /// Bilinear. This is the default.
    #[default]
    Bilinear,
    /// Catmull-Rom bicubic.
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with window 3. Sharpest, slowest.
    Lanczos3,
}

impl ResizeFilter {
    /// Map to the `image` crate filter.
    pub(crate) fn to_filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Configuration for a storyboard run.
///
/// A default-constructed value uses the 11 × 6 grid on a 4092 × 4092
/// canvas, bilinear resampling, the blank-canvas empty-video policy, and
/// JPEG quality 90.
#[derive(Clone)]
#[must_use]
pub struct GridOptions {
    pub(crate) grid: GridSpec,
    pub(crate) empty_policy: EmptyVideoPolicy,
    pub(crate) filter: ResizeFilter,
    pub(crate) jpeg_quality: u8,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            empty_policy: EmptyVideoPolicy::default(),
            filter: ResizeFilter::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            progress: Arc::new(NoOpProgress),
        }
    }
}

impl Debug for GridOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GridOptions")
            .field("grid", &self.grid)
            .field("empty_policy", &self.empty_policy)
            .field("filter", &self.filter)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish_non_exhaustive()
    }
}

impl GridOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid layout.
    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    /// Set the empty-video policy.
    pub fn with_empty_policy(mut self, policy: EmptyVideoPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    /// Set the resampling filter.
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the JPEG quality (clamped to 1–100). Ignored for other formats.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The configured grid layout.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// The configured empty-video policy.
    pub fn empty_policy(&self) -> EmptyVideoPolicy {
        self.empty_policy
    }

    /// The configured resampling filter.
    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    /// The configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}
