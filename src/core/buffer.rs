//! # Cell Buffer & Viewport
//!
//! The virtual grid: a growable 2D store of [`Cell`]s, independent of the
//! physical terminal size, plus the viewport that decides which part of it is
//! mirrored onto the backend.
//!
//! Rows and columns grow on demand and are backfilled with the buffer's
//! default cell; growth never truncates. Every draw operation updates the
//! grid first and forwards to the backend only for positions at or beyond the
//! viewport origin, at translated coordinates `(x - view.x, y - view.y)`.
//!
//! Negative coordinates are a defined no-op (logged at debug level): the grid
//! only ever covers the non-negative quadrant.

use log::debug;
use unicode_width::UnicodeWidthChar;

use crate::backend::{Backend, BackendError};
use crate::core::cell::{Cell, Color};

/// The rectangular window into the grid currently mirrored onto the terminal.
///
/// Position is clamped to ≥ 0. Size tracks backend resize notifications and
/// bounds full repaints; a zero dimension means "not yet known" and leaves
/// that side unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    /// Whether a buffer position is forwarded to the backend.
    ///
    /// Only the lower bound is checked — the backend clips overflow on the
    /// far edges itself.
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y
    }

    /// Like [`Viewport::contains`], additionally bounded by the known size.
    /// Used by full repaints so an oversized grid doesn't flood the backend.
    fn contains_sized(&self, x: i32, y: i32) -> bool {
        self.contains(x, y)
            && (self.width == 0 || x < self.x + i32::from(self.width))
            && (self.height == 0 || y < self.y + i32::from(self.height))
    }
}

/// The growable virtual grid and its viewport.
///
/// All operations are synchronous; the owning context serializes access with
/// a single lock, so one operation's grid update and backend writes are never
/// interleaved with another's.
pub struct CellBuffer {
    rows: Vec<Vec<Cell>>,
    default_cell: Cell,
    view: Viewport,
}

impl CellBuffer {
    pub fn new(default_cell: Cell) -> Self {
        Self { rows: Vec::new(), default_cell, view: Viewport::default() }
    }

    pub fn default_cell(&self) -> Cell {
        self.default_cell
    }

    pub fn viewport(&self) -> Viewport {
        self.view
    }

    /// Store `cell` at (x, y), growing the grid as needed, and forward it to
    /// the backend when the position is inside the viewport.
    pub fn set_cell(
        &mut self,
        backend: &dyn Backend,
        x: i32,
        y: i32,
        cell: Cell,
    ) -> Result<(), BackendError> {
        if x < 0 || y < 0 {
            debug!("set_cell out of bounds at ({x}, {y}), ignoring");
            return Ok(());
        }
        self.store(x as usize, y as usize, cell);
        self.forward(backend, x, y, &cell)
    }

    /// The stored cell, or the default cell outside the allocated rectangle.
    pub fn get_cell(&self, x: i32, y: i32) -> Cell {
        if x < 0 || y < 0 {
            return self.default_cell;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(self.default_cell)
    }

    /// Replace row `y`: the prior row is cleared to default cells, then
    /// `cells` are installed from column 0. Only in-viewport cells redraw.
    pub fn set_row(
        &mut self,
        backend: &dyn Backend,
        y: i32,
        cells: &[Cell],
    ) -> Result<(), BackendError> {
        if y < 0 {
            debug!("set_row out of bounds at {y}, ignoring");
            return Ok(());
        }
        self.clear_row(backend, y)?;
        for (x, cell) in cells.iter().enumerate() {
            self.set_cell(backend, x as i32, y, *cell)?;
        }
        Ok(())
    }

    /// Replace column `x`: the prior column is cleared to default cells, then
    /// `cells` are installed from row 0. Only in-viewport cells redraw.
    pub fn set_column(
        &mut self,
        backend: &dyn Backend,
        x: i32,
        cells: &[Cell],
    ) -> Result<(), BackendError> {
        if x < 0 {
            debug!("set_column out of bounds at {x}, ignoring");
            return Ok(());
        }
        self.clear_column(backend, x)?;
        for (y, cell) in cells.iter().enumerate() {
            self.set_cell(backend, x, y as i32, *cell)?;
        }
        Ok(())
    }

    /// Reset every existing cell in row `y` to the default cell, locally and
    /// on the backend. Does not grow the grid.
    pub fn clear_row(&mut self, backend: &dyn Backend, y: i32) -> Result<(), BackendError> {
        if y < 0 {
            return Ok(());
        }
        let default_cell = self.default_cell;
        let Some(row) = self.rows.get_mut(y as usize) else {
            return Ok(());
        };
        let columns = row.len();
        row.fill(default_cell);
        for x in 0..columns {
            self.forward(backend, x as i32, y, &default_cell)?;
        }
        Ok(())
    }

    /// Reset every existing cell in column `x` to the default cell, locally
    /// and on the backend. Does not grow the grid.
    pub fn clear_column(&mut self, backend: &dyn Backend, x: i32) -> Result<(), BackendError> {
        if x < 0 {
            return Ok(());
        }
        let default_cell = self.default_cell;
        let mut touched = Vec::new();
        for (y, row) in self.rows.iter_mut().enumerate() {
            if let Some(cell) = row.get_mut(x as usize) {
                *cell = default_cell;
                touched.push(y);
            }
        }
        for y in touched {
            self.forward(backend, x, y as i32, &default_cell)?;
        }
        Ok(())
    }

    /// Write `text` left to right starting at (x, y), advancing by displayed
    /// width — wide characters occupy two columns, zero-width ones are skipped.
    pub fn set_text(
        &mut self,
        backend: &dyn Backend,
        x: i32,
        y: i32,
        text: &str,
        foreground: Color,
        background: Color,
    ) -> Result<(), BackendError> {
        let mut column = x;
        for symbol in text.chars() {
            let width = symbol.width().unwrap_or(0);
            if width == 0 {
                continue;
            }
            self.set_cell(backend, column, y, Cell::new(symbol, foreground, background))?;
            column += width as i32;
        }
        Ok(())
    }

    /// Discard the whole grid and clear the backend display using the
    /// default cell's colors.
    pub fn clear(&mut self, backend: &dyn Backend) -> Result<(), BackendError> {
        self.rows.clear();
        backend.clear(self.default_cell.foreground, self.default_cell.background)
    }

    /// Move the viewport (clamped to ≥ 0) and repaint it in full.
    pub fn set_view_position(
        &mut self,
        backend: &dyn Backend,
        x: i32,
        y: i32,
    ) -> Result<(), BackendError> {
        self.view.x = x.max(0);
        self.view.y = y.max(0);
        self.redraw_view(backend)
    }

    /// Record new terminal dimensions from a resize notification.
    pub fn set_view_size(&mut self, width: u16, height: u16) {
        self.view.width = width;
        self.view.height = height;
    }

    /// Full repaint: clear the backend, then push every grid cell inside the
    /// viewport at translated coordinates.
    ///
    /// O(grid size), which is fine — repaints are user-input-triggered, not
    /// per-frame.
    pub fn redraw_view(&self, backend: &dyn Backend) -> Result<(), BackendError> {
        backend.clear(self.default_cell.foreground, self.default_cell.background)?;
        for (y, row) in self.rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let (x, y) = (x as i32, y as i32);
                if !self.view.contains_sized(x, y) {
                    continue;
                }
                let (Ok(column), Ok(line)) =
                    (u16::try_from(x - self.view.x), u16::try_from(y - self.view.y))
                else {
                    continue;
                };
                backend.set_cell(column, line, cell)?;
            }
        }
        Ok(())
    }

    /// Grow (rows first, then columns in the target row) so (x, y) exists,
    /// backfilling with the default cell, and store `cell` there.
    fn store(&mut self, x: usize, y: usize, cell: Cell) {
        if y >= self.rows.len() {
            self.rows.resize_with(y + 1, Vec::new);
        }
        let row = &mut self.rows[y];
        if x >= row.len() {
            row.resize(x + 1, self.default_cell);
        }
        row[x] = cell;
    }

    fn forward(
        &self,
        backend: &dyn Backend,
        x: i32,
        y: i32,
        cell: &Cell,
    ) -> Result<(), BackendError> {
        if !self.view.contains(x, y) {
            return Ok(());
        }
        // Translated coordinates past the backend's u16 range cannot be drawn;
        // the grid cell is kept, the forward is skipped.
        let (Ok(column), Ok(line)) =
            (u16::try_from(x - self.view.x), u16::try_from(y - self.view.y))
        else {
            return Ok(());
        };
        backend.set_cell(column, line, cell)
    }

    #[cfg(test)]
    pub(crate) fn row_len(&self, y: usize) -> Option<usize> {
        self.rows.get(y).map(Vec::len)
    }

    #[cfg(test)]
    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }
}
