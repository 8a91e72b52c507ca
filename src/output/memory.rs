//! In-memory display.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::canvas::Cell;
use crate::color::Color;
use crate::error::Result;
use crate::output::CellSink;

#[derive(Debug, Default)]
struct DisplayState {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    emits: u64,
    queries: u64,
    failing: bool,
}

impl DisplayState {
    fn index(&self, row: u16, col: u16) -> Option<usize> {
        (row < self.height && col < self.width)
            .then(|| usize::from(row) * usize::from(self.width) + usize::from(col))
    }
}

/// A virtual character display held in memory.
///
/// Clones share the same screen, so a test can hand one clone to a scene and
/// inspect or resize the display through another. Writes outside the screen
/// are dropped, as a terminal would clip them.
#[derive(Debug, Clone, Default)]
pub struct VirtualDisplay {
    state: Arc<Mutex<DisplayState>>,
}

impl VirtualDisplay {
    /// Create a display of `width` x `height` blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let display = Self::default();
        display.resize(width, height);
        display
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the screen size. Content is discarded, as on a real resize.
    pub fn resize(&self, width: u16, height: u16) {
        let mut state = self.lock();
        state.width = width;
        state.height = height;
        state.cells = vec![Cell::default(); usize::from(width) * usize::from(height)];
    }

    /// Make subsequent emits fail with an I/O error (or succeed again).
    pub fn fail_writes(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// The cell shown at a position.
    #[must_use]
    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        let state = self.lock();
        state.index(row, col).map(|i| state.cells[i])
    }

    /// The glyphs of one row as a string.
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        let state = self.lock();
        (0..state.width)
            .filter_map(|col| state.index(row, col))
            .map(|i| state.cells[i].glyph)
            .collect()
    }

    /// The whole screen as text, one line per row.
    #[must_use]
    pub fn text(&self) -> String {
        let height = self.lock().height;
        (0..height).map(|row| self.row_text(row) + "\n").collect()
    }

    /// Number of cells emitted so far.
    #[must_use]
    pub fn emit_count(&self) -> u64 {
        self.lock().emits
    }

    /// Number of times the size has been queried through [`CellSink`].
    #[must_use]
    pub fn dimension_queries(&self) -> u64 {
        self.lock().queries
    }
}

impl CellSink for VirtualDisplay {
    fn emit(
        &mut self,
        row: u16,
        col: u16,
        glyph: char,
        foreground: Color,
        background: Color,
    ) -> Result<()> {
        let mut state = self.lock();
        if state.failing {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "display unavailable").into());
        }
        state.emits += 1;
        if let Some(i) = state.index(row, col) {
            state.cells[i] = Cell { glyph, foreground, background };
        }
        Ok(())
    }

    fn dimensions(&self) -> Result<(u16, u16)> {
        let mut state = self.lock();
        state.queries += 1;
        Ok((state.width, state.height))
    }
}
