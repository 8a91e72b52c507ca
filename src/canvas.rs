//! Character-cell canvas.
//!
//! Owns the cell buffer mirrored onto a [`CellSink`]. The buffer is stored
//! row-major, slot `row * width + col`, and always matches the sink's
//! dimensions: whenever a mismatch is noticed the buffer is reallocated and
//! cleared.

use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::Result;
use crate::geometry::Rect;
use crate::output::CellSink;
use crate::render::CellWrite;

/// One addressable unit of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Glyph shown in the cell.
    pub glyph: char,
    /// Glyph color.
    pub foreground: Color,
    /// Cell background color.
    pub background: Color,
}

impl Cell {
    /// An empty cell with the given colors.
    #[must_use]
    pub const fn blank(foreground: Color, background: Color) -> Self {
        Self { glyph: ' ', foreground, background }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Color::White, Color::Black)
    }
}

/// How a rasterized color is applied to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// The glyph takes the color; the background stays fixed.
    #[default]
    ColoredSymbol,
    /// The background takes the color and the glyph is painted over it in
    /// the same color, giving a solid block.
    ColoredBlock,
}

/// Cell buffer plus the sink it is mirrored to.
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    mode: DrawMode,
    blank: Cell,
    sink: Box<dyn CellSink>,
    /// Set while a frame holds the dimensions queried at its start.
    in_frame: bool,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mode", &self.mode)
            .field("blank", &self.blank)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Create a canvas sized to the sink, cleared to `blank`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot report its size or rejects the
    /// initial clear.
    pub fn new(sink: Box<dyn CellSink>, mode: DrawMode, blank: Cell) -> Result<Self> {
        let (width, height) = sink.dimensions()?;
        let mut canvas =
            Self { width: 0, height: 0, cells: Vec::new(), mode, blank, sink, in_frame: false };
        canvas.resize(width, height)?;
        Ok(canvas)
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Drawing mode.
    #[must_use]
    pub const fn mode(&self) -> DrawMode {
        self.mode
    }

    /// The cell cleared slots are reset to.
    #[must_use]
    pub const fn blank(&self) -> Cell {
        self.blank
    }

    #[inline]
    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < usize::from(self.height) && col < usize::from(self.width))
            .then(|| row * usize::from(self.width) + col)
    }

    /// Whether anything inside `bounds` can land on the grid.
    ///
    /// Cell coordinates truncate toward zero, so the grid is widened by one
    /// cell on every side before testing.
    #[must_use]
    pub fn overlaps(&self, bounds: &Rect) -> bool {
        // NaN coordinates still rasterize (to cell 0), so they never count as off grid.
        if [bounds.x, bounds.y, bounds.width, bounds.height].iter().any(|v| v.is_nan()) {
            return true;
        }
        let grid =
            Rect::new(-1.0, -1.0, f64::from(self.width) + 1.0, f64::from(self.height) + 1.0);
        grid.intersects(bounds)
    }

    /// Read back a slot. `None` outside the grid.
    #[must_use]
    pub fn get_cell(&self, row: i32, col: i32) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// The cell a rasterized glyph/color pair becomes under the current mode.
    #[must_use]
    pub const fn style(&self, glyph: char, color: Color) -> Cell {
        match self.mode {
            DrawMode::ColoredSymbol => {
                Cell { glyph, foreground: color, background: self.blank.background }
            }
            DrawMode::ColoredBlock => Cell { glyph, foreground: color, background: color },
        }
    }

    /// Write a slot and forward it to the sink.
    ///
    /// A position outside the buffer is taken as a hint that the sink changed
    /// size: the dimensions are re-queried and, if they differ, the buffer is
    /// reallocated and cleared before the write is retried. Inside a
    /// [`frame`](Self::frame) the dimensions were queried when it began, so
    /// off-grid writes are dropped without asking the sink again.
    ///
    /// # Errors
    ///
    /// Only sink failures are reported.
    pub fn set_cell(&mut self, row: i32, col: i32, cell: Cell) -> Result<()> {
        let index = match self.index(row, col) {
            Some(index) => index,
            None if self.in_frame => return Ok(()),
            None => {
                self.sync_dimensions()?;
                match self.index(row, col) {
                    Some(index) => index,
                    None => {
                        trace!("dropping off-grid write at ({col}, {row})");
                        return Ok(());
                    }
                }
            }
        };

        self.cells[index] = cell;
        // Both coordinates are within u16 bounds once indexed.
        self.sink.emit(row as u16, col as u16, cell.glyph, cell.foreground, cell.background)
    }

    /// Reset a slot to the blank cell and forward it to the sink.
    pub fn clear_cell(&mut self, row: i32, col: i32) -> Result<()> {
        self.set_cell(row, col, self.blank)
    }

    /// Draw one rasterized cell.
    pub fn paint(&mut self, write: &CellWrite) -> Result<()> {
        self.set_cell(write.row, write.col, self.style(write.glyph, write.color))
    }

    /// Clear the slot a rasterized cell occupies.
    pub fn erase(&mut self, write: &CellWrite) -> Result<()> {
        self.clear_cell(write.row, write.col)
    }

    /// Reallocate to `width` x `height` and clear every cell, on the sink too.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.width = width;
        self.height = height;
        self.cells = vec![self.blank; usize::from(width) * usize::from(height)];
        self.flush_all()
    }

    /// Reset every cell to blank, on the sink too.
    pub fn clear(&mut self) -> Result<()> {
        self.cells.fill(self.blank);
        self.flush_all()
    }

    fn flush_all(&mut self) -> Result<()> {
        let blank = self.blank;
        for row in 0..self.height {
            for col in 0..self.width {
                self.sink.emit(row, col, blank.glyph, blank.foreground, blank.background)?;
            }
        }
        Ok(())
    }

    /// Run `draw` against dimensions queried once up front.
    ///
    /// The sink is asked for its size when the frame begins (reallocating on
    /// mismatch); writes inside `draw` that fall off the grid are dropped.
    ///
    /// # Errors
    ///
    /// Sink failures from the size query or from `draw`.
    pub fn frame<T>(&mut self, draw: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.sync_dimensions()?;
        self.in_frame = true;
        let result = draw(self);
        self.in_frame = false;
        result
    }

    /// Compare against the sink's current size and reallocate on mismatch.
    ///
    /// Returns `true` if the buffer was reallocated.
    pub fn sync_dimensions(&mut self) -> Result<bool> {
        let (width, height) = self.sink.dimensions()?;
        if (width, height) == (self.width, self.height) {
            return Ok(false);
        }
        info!("display resized from {}x{} to {width}x{height}", self.width, self.height);
        self.resize(width, height)?;
        Ok(true)
    }
}
