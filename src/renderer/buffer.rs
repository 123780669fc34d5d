//! The cell grid everything is painted into.
//!
//! Flat row-major storage (`index = y * width + x`). The viewer keeps one
//! buffer alive across frames; atoms are painted over whatever is there,
//! which is how trails persist when erase is off.

use unicode_width::UnicodeWidthChar;

use crate::types::{Attr, Cell, ClipRect, Rgba};

/// Display width of a character in cells (0, 1, or 2).
#[inline]
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Display width of a string in cells.
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// =============================================================================
// FrameBuffer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The whole buffer as a clip rect.
    #[inline]
    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to a blank with the given background.
    pub fn clear_with_bg(&mut self, bg: Rgba) {
        self.cells.fill(Cell {
            bg,
            ..Cell::default()
        });
    }

    /// Resize and blank the buffer.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width as usize * height as usize, Cell::default());
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Set one cell. Returns false when it falls outside the buffer or `clip`.
    #[allow(clippy::too_many_arguments)]
    pub fn set_cell(
        &mut self,
        x: u16,
        y: u16,
        char: u32,
        fg: Rgba,
        bg: Rgba,
        attrs: Attr,
        clip: Option<&ClipRect>,
    ) -> bool {
        if clip.is_some_and(|c| !c.contains(x, y)) {
            return false;
        }
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = Cell { char, fg, bg, attrs };
                true
            }
            None => false,
        }
    }

    /// Paint a solid background block.
    pub fn fill_rect(&mut self, rect: ClipRect, bg: Rgba, clip: Option<&ClipRect>) {
        let mut x1 = rect.x;
        let mut y1 = rect.y;
        let mut x2 = rect.x.saturating_add(rect.width).min(self.width);
        let mut y2 = rect.y.saturating_add(rect.height).min(self.height);
        if let Some(c) = clip {
            x1 = x1.max(c.x);
            y1 = y1.max(c.y);
            x2 = x2.min(c.x.saturating_add(c.width));
            y2 = y2.min(c.y.saturating_add(c.height));
        }
        if x2 <= x1 || y2 <= y1 {
            return;
        }

        let blank = Cell {
            bg,
            ..Cell::default()
        };
        for row in y1..y2 {
            let start = self.index(x1, row);
            let end = self.index(x2, row);
            self.cells[start..end].fill(blank);
        }
    }

    /// Write text starting at (x, y). `bg: None` keeps the existing
    /// background of each cell. Returns the number of columns used.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&ClipRect>,
    ) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            let w = char_width(ch) as u16;
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > self.width {
                break;
            }
            let under = self.get(col, y).map_or(Rgba::TERMINAL_DEFAULT, |c| c.bg);
            let cell_bg = bg.unwrap_or(under);
            if self.set_cell(col, y, ch as u32, fg, cell_bg, attrs, clip) && w == 2 {
                // continuation marker for the second half of a wide char
                self.set_cell(col + 1, y, 0, fg, cell_bg, attrs, clip);
            }
            col += w;
        }
        col - x
    }

    /// Single-line box outline around `rect`.
    pub fn draw_box(&mut self, rect: ClipRect, color: Rgba, bg: Rgba) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let x2 = rect.x + rect.width - 1;
        let y2 = rect.y + rect.height - 1;
        let mut put = |x: u16, y: u16, c: char| {
            self.set_cell(x, y, c as u32, color, bg, Attr::NONE, None);
        };

        put(rect.x, rect.y, '┌');
        put(x2, rect.y, '┐');
        put(rect.x, y2, '└');
        put(x2, y2, '┘');
        for col in rect.x + 1..x2 {
            put(col, rect.y, '─');
            put(col, y2, '─');
        }
        for row in rect.y + 1..y2 {
            put(rect.x, row, '│');
            put(x2, row, '│');
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
