//! Differential terminal output.
//!
//! Each redraw compares the new buffer with the one last sent and writes only
//! the cells that changed, inside a synchronized-output block, with a single
//! flush. Atoms move a few cells per frame, so most of the screen is skipped.

use std::io::{self, Write};

use super::ansi;
use super::buffer::FrameBuffer;
use super::output::{OutputBuffer, StatefulCellRenderer};

pub struct DiffRenderer {
    output: OutputBuffer,
    cell_renderer: StatefulCellRenderer,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            cell_renderer: StatefulCellRenderer::new(),
            previous: None,
        }
    }

    /// Send the changed cells to stdout. Returns true if anything changed.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<bool> {
        let changed = self.encode(buffer)?;
        self.output.flush_stdout()?;
        Ok(changed)
    }

    /// Like [`render`](Self::render), writing to `writer` instead of stdout.
    pub fn render_to<W: Write>(&mut self, buffer: &FrameBuffer, writer: &mut W) -> io::Result<bool> {
        let changed = self.encode(buffer)?;
        self.output.drain_into(writer)?;
        Ok(changed)
    }

    /// Redraw every cell. Use after a resize or when the screen was disturbed.
    pub fn render_full(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        self.invalidate();
        self.render(buffer).map(|_| ())
    }

    /// Forget the previous buffer; the next render repaints everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    fn encode(&mut self, buffer: &FrameBuffer) -> io::Result<bool> {
        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == buffer.width() && p.height() == buffer.height());

        ansi::begin_sync(&mut self.output)?;
        if previous.is_none() {
            ansi::reset(&mut self.output)?;
            ansi::clear_screen(&mut self.output)?;
        }
        self.cell_renderer.reset();

        let mut changed = false;
        let width = buffer.width() as usize;
        for (i, cell) in buffer.cells().iter().enumerate() {
            if previous.as_ref().is_some_and(|p| p.cells()[i] == *cell) {
                continue;
            }
            changed = true;
            let x = (i % width) as u16;
            let y = (i / width) as u16;
            self.cell_renderer.render_cell(&mut self.output, x, y, cell);
        }

        ansi::reset(&mut self.output)?;
        ansi::end_sync(&mut self.output)?;

        match previous {
            Some(mut p) => {
                p.clone_from(buffer);
                self.previous = Some(p);
            }
            None => self.previous = Some(buffer.clone()),
        }
        Ok(changed)
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attr, Rgba};

    fn render(renderer: &mut DiffRenderer, buffer: &FrameBuffer) -> (bool, String) {
        let mut out = Vec::new();
        let changed = renderer.render_to(buffer, &mut out).unwrap();
        (changed, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_first_render_paints_everything() {
        let mut renderer = DiffRenderer::new();
        assert!(!renderer.has_previous());
        let buffer = FrameBuffer::new(3, 2);
        let (changed, out) = render(&mut renderer, &buffer);
        assert!(changed);
        assert!(out.contains("\x1b[2J"));
        assert!(renderer.has_previous());
    }

    #[test]
    fn test_unchanged_buffer_writes_no_cells() {
        let mut renderer = DiffRenderer::new();
        let buffer = FrameBuffer::new(3, 2);
        render(&mut renderer, &buffer);
        let (changed, out) = render(&mut renderer, &buffer);
        assert!(!changed);
        assert!(!out.contains('H'));
    }

    #[test]
    fn test_only_changed_cell_is_sent() {
        let mut renderer = DiffRenderer::new();
        let mut buffer = FrameBuffer::new(5, 5);
        render(&mut renderer, &buffer);

        buffer.set_cell(3, 2, ' ' as u32, Rgba::WHITE, Rgba::rgb(255, 0, 0), Attr::NONE, None);
        let (changed, out) = render(&mut renderer, &buffer);
        assert!(changed);
        assert!(out.contains("\x1b[3;4H"));
        assert!(out.contains("48;2;255;0;0"));
        assert!(!out.contains("\x1b[1;1H"));
    }

    #[test]
    fn test_invalidate_and_resize_repaint() {
        let mut renderer = DiffRenderer::new();
        let buffer = FrameBuffer::new(2, 2);
        render(&mut renderer, &buffer);
        renderer.invalidate();
        assert!(render(&mut renderer, &buffer).0);

        let bigger = FrameBuffer::new(3, 3);
        let (changed, out) = render(&mut renderer, &bigger);
        assert!(changed);
        assert!(out.contains("\x1b[2J"));
    }
}
