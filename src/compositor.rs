//! Grid composition.
//!
//! Every sampled frame is scaled to cover its cell without distortion,
//! center-cropped to the exact cell size, and written into the canvas.
//! Sequence position 0 occupies the bottom-left cell; positions fill each
//! row left to right and the rows upward.

use std::sync::Arc;

use image::{GenericImage, RgbImage, imageops};

use crate::config::ResizeFilter;
use crate::error::GridError;
use crate::grid::GridSpec;
use crate::progress::{NoOpProgress, Phase, ProgressCallback, ProgressTracker};
use crate::sampler::SampledSequence;
use crate::source::Frame;

/// The composited storyboard. Black wherever no cell was written.
pub type Canvas = RgbImage;

/// Resize and crop parameters that map one frame onto one cell.
///
/// The frame is scaled to `resized_width × resized_height`, which covers
/// the cell in both directions, then the `cell_width × cell_height` window
/// at `(crop_x, crop_y)` is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    /// Width after aspect-preserving scaling.
    pub resized_width: u32,
    /// Height after aspect-preserving scaling.
    pub resized_height: u32,
    /// Left edge of the crop window in the resized frame.
    pub crop_x: u32,
    /// Top edge of the crop window in the resized frame.
    pub crop_y: u32,
    /// Cell width.
    pub cell_width: u32,
    /// Cell height.
    pub cell_height: u32,
}

impl CellGeometry {
    /// Compute the fill-and-crop geometry for a frame and a cell.
    ///
    /// A frame relatively wider than the cell is scaled to the cell height,
    /// otherwise to the cell width. Returns `None` if any dimension is zero.
    ///
    /// ```
    /// use looking_glass::CellGeometry;
    ///
    /// // 16:9 frame into a square cell: match height, crop the sides.
    /// let g = CellGeometry::fit(1920, 1080, 360, 360).unwrap();
    /// assert_eq!((g.resized_width, g.resized_height), (640, 360));
    /// assert_eq!((g.crop_x, g.crop_y), (140, 0));
    /// ```
    pub fn fit(
        frame_width: u32,
        frame_height: u32,
        cell_width: u32,
        cell_height: u32,
    ) -> Option<Self> {
        if frame_width == 0 || frame_height == 0 || cell_width == 0 || cell_height == 0 {
            return None;
        }

        // Compare aspect ratios and scale in integer arithmetic so the
        // covering dimension never falls short of the cell.
        let (fw, fh) = (u64::from(frame_width), u64::from(frame_height));
        let (cw, ch) = (u64::from(cell_width), u64::from(cell_height));

        let (resized_width, resized_height) = if fw * ch > cw * fh {
            ((ch * fw / fh) as u32, cell_height)
        } else {
            (cell_width, (cw * fh / fw) as u32)
        };

        Some(Self {
            resized_width,
            resized_height,
            crop_x: (resized_width - cell_width) / 2,
            crop_y: (resized_height - cell_height) / 2,
            cell_width,
            cell_height,
        })
    }
}

/// Scale and center-crop a frame to exactly `cell_width × cell_height`.
///
/// Returns `None` for frames or cells with a zero dimension.
pub fn fit_cell(
    frame: &Frame,
    cell_width: u32,
    cell_height: u32,
    filter: ResizeFilter,
) -> Option<RgbImage> {
    let geometry = CellGeometry::fit(frame.width(), frame.height(), cell_width, cell_height)?;

    let resized = if (geometry.resized_width, geometry.resized_height) == frame.dimensions() {
        frame.clone()
    } else {
        imageops::resize(
            frame,
            geometry.resized_width,
            geometry.resized_height,
            filter.to_filter_type(),
        )
    };

    Some(
        imageops::crop_imm(
            &resized,
            geometry.crop_x,
            geometry.crop_y,
            geometry.cell_width,
            geometry.cell_height,
        )
        .to_image(),
    )
}

/// Composite a sampled sequence onto a fresh canvas.
///
/// Uses bilinear resampling.
///
/// # Errors
///
/// Returns [`GridError::InvalidGridSpec`] if `spec` does not validate.
///
/// # Example
///
/// ```
/// use image::{Rgb, RgbImage};
/// use looking_glass::{GridSpec, SampledSequence, compositor};
///
/// let red = RgbImage::from_pixel(32, 18, Rgb([255, 0, 0]));
/// let sequence = SampledSequence::new(vec![red], vec![0], 1);
/// let spec = GridSpec::new(2, 2).with_canvas_size(64, 64);
/// let canvas = compositor::compose(&sequence, &spec).unwrap();
///
/// assert_eq!(canvas.dimensions(), (64, 64));
/// assert_eq!(canvas.get_pixel(0, 63), &Rgb([255, 0, 0]));
/// assert_eq!(canvas.get_pixel(0, 0), &Rgb([0, 0, 0]));
/// ```
pub fn compose(frames: &SampledSequence, spec: &GridSpec) -> Result<Canvas, GridError> {
    compose_with(
        frames,
        spec,
        ResizeFilter::default(),
        Arc::new(NoOpProgress),
    )
}

/// Composite a sampled sequence with an explicit filter and progress sink.
///
/// Frames past the grid capacity are ignored. Frames with a zero dimension
/// are skipped and their cell stays black.
///
/// # Errors
///
/// Returns [`GridError::InvalidGridSpec`] if `spec` does not validate, or
/// [`GridError::ImageError`] if a cell cannot be copied into the canvas.
pub fn compose_with(
    frames: &SampledSequence,
    spec: &GridSpec,
    filter: ResizeFilter,
    progress: Arc<dyn ProgressCallback>,
) -> Result<Canvas, GridError> {
    spec.validate()?;

    let mut canvas = Canvas::new(spec.canvas_width, spec.canvas_height);
    let (cell_width, cell_height) = spec.cell_size();
    let placed = frames.len().min(spec.capacity());

    log::debug!(
        "Compositing {placed} frames into {}x{} grid ({}x{} cells on {}x{} canvas)",
        spec.columns,
        spec.rows,
        cell_width,
        cell_height,
        spec.canvas_width,
        spec.canvas_height
    );

    let mut tracker = ProgressTracker::new(progress, Phase::Compositing, Some(placed as u64));

    for (position, (source_index, frame)) in frames.iter().enumerate().take(placed) {
        let Some((x, y)) = spec.cell_origin(position) else {
            break;
        };
        let Some(cell) = fit_cell(frame, cell_width, cell_height, filter) else {
            log::warn!(
                "Skipping frame {source_index} with empty dimensions {}x{}",
                frame.width(),
                frame.height()
            );
            tracker.advance(Some(source_index));
            continue;
        };
        canvas.copy_from(&cell, x, y)?;
        tracker.advance(Some(source_index));
    }
    tracker.finish();

    Ok(canvas)
}
