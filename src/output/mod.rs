//! Cell sinks: where canvas writes end up.

mod memory;
#[cfg(feature = "terminal")]
mod terminal;

pub use memory::VirtualDisplay;
#[cfg(feature = "terminal")]
pub use terminal::TerminalSink;

use crate::color::Color;
use crate::error::Result;

/// A display that shows cells.
///
/// The canvas is the only writer and calls into the sink while holding the
/// scene lock, so implementations need `Send` but not `Sync`.
pub trait CellSink: Send {
    /// Show one cell immediately.
    fn emit(
        &mut self,
        row: u16,
        col: u16,
        glyph: char,
        foreground: Color,
        background: Color,
    ) -> Result<()>;

    /// Current display size as `(width, height)` in cells.
    fn dimensions(&self) -> Result<(u16, u16)>;
}

impl<S: CellSink + ?Sized> CellSink for Box<S> {
    fn emit(
        &mut self,
        row: u16,
        col: u16,
        glyph: char,
        foreground: Color,
        background: Color,
    ) -> Result<()> {
        (**self).emit(row, col, glyph, foreground, background)
    }

    fn dimensions(&self) -> Result<(u16, u16)> {
        (**self).dimensions()
    }
}
