//! # looking-glass
//!
//! Turn a video into a storyboard: sample frames at a regular stride and
//! tile them into one fixed-size grid image.
//!
//! Decoding is done by FFmpeg through
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); resizing and
//! encoding by the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use looking_glass::{GridError, GridSpec};
//!
//! // 11 × 6 cells on a 4092 × 4092 canvas.
//! looking_glass::video_to_grid("input.mp4", "outputs/input_qs11x6.jpg", &GridSpec::default())?;
//! # Ok::<(), GridError>(())
//! ```
//!
//! ## How frames are chosen
//!
//! For a grid of `count = columns × rows` cells and a video of
//! `total_frames` frames, every `max(1, (total_frames - 1) / (count - 1))`-th
//! frame is kept, plus the very last frame, until the grid is full. The kept
//! frames are then reversed, so the latest one lands in the bottom-left cell
//! and earlier frames fill rightwards and upwards.
//!
//! ## How frames are placed
//!
//! Each frame is scaled, preserving aspect ratio, until it covers its cell,
//! then center-cropped to the cell size. Cell size is the canvas size
//! divided by the grid shape (integer division); leftover pixels along the
//! right and bottom edges stay black.
//!
//! ## Step by step
//!
//! ```no_run
//! use looking_glass::{GridError, GridSpec, MediaFile, compositor, encode, sampler};
//!
//! let spec = GridSpec::new(4, 4).with_canvas_size(1600, 900);
//! spec.validate()?;
//!
//! let mut source = MediaFile::open("input.mp4")?;
//! let frames = sampler::sample(&mut source, spec.capacity())?;
//! let canvas = compositor::compose(&frames, &spec)?;
//! encode::save_canvas(&canvas, "grid.jpg", 90)?;
//! # Ok::<(), GridError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod compositor;
pub mod config;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod grid;
mod metadata;
pub mod progress;
pub mod sampler;
pub mod source;
pub mod storyboard;
mod utilities;

pub use compositor::{Canvas, CellGeometry};
pub use config::{EmptyVideoPolicy, GridOptions, ResizeFilter};
pub use error::GridError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use grid::GridSpec;
pub use metadata::VideoMetadata;
pub use progress::{Phase, ProgressCallback, ProgressInfo};
pub use sampler::SampledSequence;
pub use source::{Frame, FrameSequence, MediaFile, VideoSource};
pub use storyboard::{Storyboard, StoryboardReport, video_to_grid, video_to_grid_with_options};
