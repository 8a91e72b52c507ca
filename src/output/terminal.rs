//! Terminal cell sink (crossterm).
//!
//! Every emitted cell is written as a cursor move, a color change and the
//! glyph, then flushed, so the terminal always reflects the canvas.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{ExecutableCommand, QueueableCommand};

use crate::color::Color;
use crate::error::Result;
use crate::output::CellSink;

/// Cell sink that draws on a terminal.
///
/// The cursor is hidden while the sink is alive.
pub struct TerminalSink<W: Write + Send = Stdout> {
    out: W,
    /// Fixed size instead of querying the terminal.
    size: Option<(u16, u16)>,
}

impl TerminalSink<Stdout> {
    /// Draw on standard output.
    pub fn stdout() -> Result<Self> {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSink<W> {
    /// Draw on an arbitrary writer; dimensions come from the controlling
    /// terminal.
    pub fn new(mut out: W) -> Result<Self> {
        out.execute(Hide)?;
        Ok(Self { out, size: None })
    }

    /// Draw on a writer that reports a fixed size.
    pub fn with_size(out: W, width: u16, height: u16) -> Result<Self> {
        let mut sink = Self::new(out)?;
        sink.size = Some((width, height));
        Ok(sink)
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write + Send> CellSink for TerminalSink<W> {
    fn emit(
        &mut self,
        row: u16,
        col: u16,
        glyph: char,
        foreground: Color,
        background: Color,
    ) -> Result<()> {
        self.out
            .queue(MoveTo(col, row))?
            .queue(SetForegroundColor(foreground.into()))?
            .queue(SetBackgroundColor(background.into()))?
            .queue(Print(glyph))?
            .queue(ResetColor)?;
        self.out.flush()?;
        Ok(())
    }

    fn dimensions(&self) -> Result<(u16, u16)> {
        match self.size {
            Some(size) => Ok(size),
            None => Ok(crossterm::terminal::size()?),
        }
    }
}

impl<W: Write + Send> Drop for TerminalSink<W> {
    fn drop(&mut self) {
        let _ = self.out.execute(Show);
    }
}
