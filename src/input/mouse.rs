//! Mouse Module - drag tracking and pointer readout
//!
//! A left drag rotates the view: every motion event rotates by the distance
//! moved since the previous one, and the release applies whatever is left.
//! Middle click steps one frame, right click quits. Bare motion over the
//! view area drives the cursor coordinate readout.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::pipeline::session::Command;
use crate::pipeline::terminal::ViewLayout;

/// Drag state between mouse events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MouseTracker {
    /// Last position seen while the left button is held.
    last: Option<(u16, u16)>,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// Translate one mouse event.
    pub fn handle(&mut self, event: MouseEvent, layout: &ViewLayout) -> Option<Command> {
        let pos = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.last = Some(pos);
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => self.drag_to(pos),
            MouseEventKind::Up(MouseButton::Left) => {
                let command = self.drag_to(pos);
                self.last = None;
                command
            }
            MouseEventKind::Down(MouseButton::Middle) => Some(Command::Advance),
            MouseEventKind::Down(MouseButton::Right) => Some(Command::Quit),
            MouseEventKind::Moved => Some(match layout.area_cell(pos.0, pos.1) {
                Some((x, y)) => Command::Cursor { x, y },
                None => Command::CursorLeft,
            }),
            _ => None,
        }
    }

    fn drag_to(&mut self, pos: (u16, u16)) -> Option<Command> {
        let (lx, ly) = self.last?;
        self.last = Some(pos);
        let dx = lx as i32 - pos.0 as i32;
        let dy = ly as i32 - pos.1 as i32;
        (dx != 0 || dy != 0).then_some(Command::Drag { dx, dy })
    }
}

// =============================================================================
// TESTS
// =============================================================================
