//! Byte staging and style-tracking cell output.
//!
//! A redraw is encoded into an [`OutputBuffer`] and leaves the process in one
//! write. [`StatefulCellRenderer`] tracks where the terminal cursor is and
//! which pen it is holding, so neighbouring atom cells of the same color cost
//! a single character each.

use std::borrow::Cow;
use std::io::{self, Write};

use super::ansi;
use super::buffer::FrameBuffer;
use crate::types::{Attr, Cell, Rgba};

/// Initial capacity: a full 200x60 repaint with colors fits without growing.
const STAGING_CAPACITY: usize = 16 * 1024;

#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(STAGING_CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append a cell character. Codepoints that are not chars are dropped.
    pub fn push_codepoint(&mut self, codepoint: u32) {
        if let Some(c) = char::from_u32(codepoint) {
            let mut utf8 = [0u8; 4];
            self.bytes.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Hand the staged bytes to `sink` and start over.
    pub fn drain_into<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        if !self.bytes.is_empty() {
            sink.write_all(&self.bytes)?;
            sink.flush()?;
            self.bytes.clear();
        }
        Ok(())
    }

    pub fn flush_stdout(&mut self) -> io::Result<()> {
        self.drain_into(&mut io::stdout().lock())
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Colors and attributes the terminal is currently drawing with.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pen {
    fg: Rgba,
    bg: Rgba,
    attrs: Attr,
}

/// Writes cells, leaving out cursor moves and SGR codes that change nothing.
///
/// Writes into an in-memory buffer cannot fail, so escape helper results are
/// ignored here.
#[derive(Debug, Default)]
pub struct StatefulCellRenderer {
    /// Where the terminal cursor sits after the last character.
    next: Option<(u16, u16)>,
    pen: Option<Pen>,
}

impl StatefulCellRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assume nothing about the terminal.
    pub fn reset(&mut self) {
        self.next = None;
        self.pen = None;
    }

    fn select_pen(&mut self, output: &mut OutputBuffer, cell: &Cell) {
        let want = Pen {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attrs,
        };
        let held = match self.pen {
            Some(pen) if pen.attrs == want.attrs => Some(pen),
            _ => {
                // attributes can only be switched off by a full reset
                let _ = ansi::reset(output);
                let _ = ansi::attrs(output, want.attrs);
                None
            }
        };
        if held.is_none_or(|p| p.fg != want.fg) {
            let _ = ansi::fg(output, want.fg);
        }
        if held.is_none_or(|p| p.bg != want.bg) {
            let _ = ansi::bg(output, want.bg);
        }
        self.pen = Some(want);
    }

    /// Draw `cell` at absolute screen position (`x`, `y`).
    pub fn render_cell(&mut self, output: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        if cell.char == 0 {
            // right half of a wide character, already covered
            self.next = x.checked_add(1).map(|nx| (nx, y));
            return;
        }
        if self.next != Some((x, y)) {
            let _ = ansi::cursor_to(output, x, y);
        }
        self.select_pen(output, cell);
        output.push_codepoint(cell.char);
        self.next = x.checked_add(1).map(|nx| (nx, y));
    }

    /// Encode `buffer` row by row without cursor addressing, for snapshot
    /// files that are replayed with `cat`.
    pub fn render_lines(&mut self, output: &mut OutputBuffer, buffer: &FrameBuffer) {
        for row in buffer.cells().chunks(buffer.width().max(1) as usize) {
            self.reset();
            for cell in row.iter().filter(|c| c.char != 0) {
                self.select_pen(output, cell);
                output.push_codepoint(cell.char);
            }
            let _ = ansi::reset(output);
            output.push_codepoint('\n' as u32);
        }
        self.reset();
    }
}

// =============================================================================
// Tests
// =============================================================================
