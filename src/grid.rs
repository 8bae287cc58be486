//! Grid layout parameters.
//!
//! [`GridSpec`] fixes the number of cells and the exact canvas size. Cell
//! dimensions are derived by integer division, so up to `columns - 1`
//! pixels on the right and `rows - 1` pixels at the bottom are never
//! covered by a cell and keep the background value.

use crate::error::GridError;

/// Default number of grid columns.
pub const DEFAULT_COLUMNS: u32 = 11;
/// Default number of grid rows.
pub const DEFAULT_ROWS: u32 = 6;
/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 4092;
/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 4092;

/// Layout of the storyboard canvas.
///
/// # Example
///
/// ```
/// use looking_glass::GridSpec;
///
/// let spec = GridSpec::new(4, 3).with_canvas_size(1200, 900);
/// assert_eq!(spec.capacity(), 12);
/// assert_eq!(spec.cell_size(), (300, 300));
/// // Sequence position 0 lands in the bottom-left cell.
/// assert_eq!(spec.cell_origin(0), Some((0, 600)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct GridSpec {
    /// Number of cells per row.
    pub columns: u32,
    /// Number of rows of cells.
    pub rows: u32,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl GridSpec {
    /// Create a spec with the given grid shape and the default canvas size.
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Set the canvas dimensions.
    pub fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    /// Check that every dimension is positive and that each cell gets at
    /// least one pixel in both directions.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidGridSpec`] naming the first offending
    /// parameter.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.columns == 0 {
            return Err(GridError::InvalidGridSpec(
                "columns must be greater than zero".to_string(),
            ));
        }
        if self.rows == 0 {
            return Err(GridError::InvalidGridSpec(
                "rows must be greater than zero".to_string(),
            ));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(GridError::InvalidGridSpec(format!(
                "canvas must be non-empty (got {}x{})",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.canvas_width < self.columns || self.canvas_height < self.rows {
            return Err(GridError::InvalidGridSpec(format!(
                "canvas {}x{} is too small for a {}x{} grid",
                self.canvas_width, self.canvas_height, self.columns, self.rows
            )));
        }
        Ok(())
    }

    /// Number of cells, which is also the number of frames to sample.
    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Cell width in pixels (`canvas_width / columns`).
    pub fn cell_width(&self) -> u32 {
        self.canvas_width / self.columns
    }

    /// Cell height in pixels (`canvas_height / rows`).
    pub fn cell_height(&self) -> u32 {
        self.canvas_height / self.rows
    }

    /// `(cell_width, cell_height)`.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width(), self.cell_height())
    }

    /// Grid `(row, column)` for a sequence position.
    ///
    /// Position 0 is the bottom-left cell; positions fill left to right and
    /// then move one row up. Returns `None` past the grid capacity.
    pub fn cell_position(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.capacity() {
            return None;
        }
        let columns = self.columns as usize;
        let row = self.rows - 1 - (index / columns) as u32;
        let column = (index % columns) as u32;
        Some((row, column))
    }

    /// Top-left pixel `(x, y)` of the cell for a sequence position.
    ///
    /// Equal to `((index % columns) * cell_width, (rows - 1 - index / columns) * cell_height)`
    /// for every position inside the grid, `None` past the capacity.
    pub fn cell_origin(&self, index: usize) -> Option<(u32, u32)> {
        self.cell_position(index)
            .map(|(row, column)| (column * self.cell_width(), row * self.cell_height()))
    }
}
