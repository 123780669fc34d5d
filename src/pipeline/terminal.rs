//! Terminal state: size signals, screen layout, and fullscreen setup.
//!
//! The size signals are the root of the layout: resize events write them,
//! [`ViewLayout::current`] reads them to place the view area and the panel.

use spark_signals::signal;
use std::cell::RefCell;
use std::io;

use crate::config::MIN_AREA;
use crate::renderer::ansi;
use crate::renderer::panel::PANEL_ROWS;
use crate::renderer::OutputBuffer;
use crate::types::ClipRect;

// =============================================================================
// Terminal Size Signals
// =============================================================================

thread_local! {
    static TERMINAL_WIDTH: RefCell<spark_signals::Signal<u16>> = RefCell::new(signal(80));
    static TERMINAL_HEIGHT: RefCell<spark_signals::Signal<u16>> = RefCell::new(signal(24));
}

pub fn terminal_width() -> u16 {
    TERMINAL_WIDTH.with(|w| w.borrow().get())
}

pub fn terminal_height() -> u16 {
    TERMINAL_HEIGHT.with(|h| h.borrow().get())
}

/// Record a new terminal size (startup and resize events).
pub fn set_terminal_size(width: u16, height: u16) {
    TERMINAL_WIDTH.with(|w| w.borrow().set(width));
    TERMINAL_HEIGHT.with(|h| h.borrow().set(height));
}

pub fn terminal_width_signal() -> spark_signals::Signal<u16> {
    TERMINAL_WIDTH.with(|w| w.borrow().clone())
}

pub fn terminal_height_signal() -> spark_signals::Signal<u16> {
    TERMINAL_HEIGHT.with(|h| h.borrow().clone())
}

/// Query the real terminal size; keeps the previous value on failure.
pub fn detect_terminal_size() {
    match crossterm::terminal::size() {
        Ok((width, height)) => set_terminal_size(width, height),
        Err(e) => log::debug!("terminal size unavailable: {e}"),
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Where things go on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLayout {
    /// Interior of the view area (the box sits one cell outside it).
    pub area: ClipRect,
    /// Status panel rows under the box.
    pub panel: ClipRect,
    /// Size of the frame buffer covering the whole screen.
    pub screen: (u16, u16),
}

impl ViewLayout {
    /// Fit the view area into a `width` x `height` terminal.
    ///
    /// A requested area is honored up to what fits; the area never shrinks
    /// below the minimum even if the terminal is too small.
    pub fn compute(width: u16, height: u16, requested: Option<(u16, u16)>) -> Self {
        let avail_w = width.saturating_sub(2).max(MIN_AREA);
        let avail_h = height.saturating_sub(2 + PANEL_ROWS).max(MIN_AREA);
        let (w, h) = match requested {
            Some((rw, rh)) => (rw.min(avail_w).max(MIN_AREA), rh.min(avail_h).max(MIN_AREA)),
            None => (avail_w, avail_h),
        };

        let area = ClipRect::new(1, 1, w, h);
        let panel = ClipRect::new(0, h + 2, width.max(w + 2), PANEL_ROWS);
        Self {
            area,
            panel,
            screen: (width.max(w + 2), height.max(h + 2 + PANEL_ROWS)),
        }
    }

    /// Layout for the current terminal size signals.
    pub fn current(requested: Option<(u16, u16)>) -> Self {
        Self::compute(terminal_width(), terminal_height(), requested)
    }

    /// Translate a screen position into a view-area cell.
    pub fn area_cell(&self, column: u16, row: u16) -> Option<(u16, u16)> {
        self.area
            .contains(column, row)
            .then(|| (column - self.area.x, row - self.area.y))
    }
}

// =============================================================================
// Fullscreen setup
// =============================================================================

/// Owns the terminal modes while the viewer runs; restores them on drop.
#[derive(Debug, Default)]
pub struct TerminalSetup {
    is_fullscreen: bool,
    is_raw: bool,
    mouse_enabled: bool,
}

impl TerminalSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Raw mode, alternate screen, hidden cursor, mouse tracking.
    pub fn enter_fullscreen(&mut self, title: &str) -> io::Result<()> {
        match crossterm::terminal::enable_raw_mode() {
            Ok(()) => self.is_raw = true,
            // not a tty: keep going, only keyboard input is lost
            Err(e) => log::warn!("raw mode unavailable: {e}"),
        }

        let mut out = OutputBuffer::new();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::set_title(&mut out, title)?;
        ansi::enable_mouse(&mut out)?;
        self.mouse_enabled = true;
        out.flush_stdout()?;

        self.is_fullscreen = true;
        log::debug!("entered fullscreen");
        Ok(())
    }

    /// Undo everything `enter_fullscreen` did.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        let mut out = OutputBuffer::new();
        if self.mouse_enabled {
            ansi::disable_mouse(&mut out)?;
            self.mouse_enabled = false;
        }
        ansi::reset(&mut out)?;
        ansi::cursor_show(&mut out)?;
        ansi::exit_alt_screen(&mut out)?;
        out.flush_stdout()?;

        if self.is_raw {
            crossterm::terminal::disable_raw_mode()?;
            self.is_raw = false;
        }
        self.is_fullscreen = false;
        log::debug!("left fullscreen");
        Ok(())
    }
}

impl Drop for TerminalSetup {
    fn drop(&mut self) {
        if self.is_fullscreen {
            if let Err(e) = self.exit_fullscreen() {
                log::error!("failed to restore terminal: {e}");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_size() {
        set_terminal_size(120, 40);
        assert_eq!(terminal_width(), 120);
        assert_eq!(terminal_height(), 40);
        assert_eq!(terminal_width_signal().get(), 120);
        assert_eq!(terminal_height_signal().get(), 40);
    }

    #[test]
    fn test_layout_fills_terminal() {
        let layout = ViewLayout::compute(80, 24, None);
        assert_eq!(layout.area, ClipRect::new(1, 1, 78, 24 - 2 - PANEL_ROWS));
        assert_eq!(layout.panel.y, layout.area.height + 2);
        assert_eq!(layout.screen, (80, 24));
    }

    #[test]
    fn test_layout_honors_requested_area() {
        let layout = ViewLayout::compute(80, 40, Some((30, 20)));
        assert_eq!((layout.area.width, layout.area.height), (30, 20));

        let clamped = ViewLayout::compute(40, 20, Some((300, 300)));
        assert_eq!(clamped.area.width, 38);
        assert_eq!(clamped.area.height, 20 - 2 - PANEL_ROWS);
    }

    #[test]
    fn test_layout_minimum_on_tiny_terminal() {
        let layout = ViewLayout::compute(5, 5, None);
        assert_eq!((layout.area.width, layout.area.height), (MIN_AREA, MIN_AREA));
        assert_eq!(layout.screen, (MIN_AREA + 2, MIN_AREA + 2 + PANEL_ROWS));
    }

    #[test]
    fn test_current_reads_signals() {
        set_terminal_size(50, 30);
        assert_eq!(ViewLayout::current(None), ViewLayout::compute(50, 30, None));
    }

    #[test]
    fn test_area_cell() {
        let layout = ViewLayout::compute(80, 24, None);
        assert_eq!(layout.area_cell(1, 1), Some((0, 0)));
        assert_eq!(layout.area_cell(0, 1), None);
        assert_eq!(layout.area_cell(10, 5), Some((9, 4)));
    }
}
