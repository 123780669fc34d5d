//! Input Module - terminal events to session commands
//!
//! Bridges crossterm's event system with the session. Keys and mouse
//! events become [`Command`]s; resizes update the terminal size signals.
//!
//! ```ignore
//! let mut router = InputRouter::new();
//! while let Some(event) = poll_event(Duration::from_millis(5))? {
//!     match router.route(event, &layout) {
//!         InputEvent::Command(cmd) => session.handle(cmd),
//!         InputEvent::Resize(w, h) => relayout(w, h),
//!         InputEvent::None => {}
//!     }
//! }
//! ```

pub mod keyboard;
pub mod mouse;

use crossterm::event::{poll, read, Event};
use std::io;
use std::time::Duration;

use crate::pipeline::session::Command;
use crate::pipeline::terminal::{set_terminal_size, ViewLayout};

pub use keyboard::command_for_key;
pub use mouse::MouseTracker;

// =============================================================================
// INPUT EVENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Command(Command),
    /// The terminal changed size; the signals already hold the new value.
    Resize(u16, u16),
    None,
}

// =============================================================================
// POLLING
// =============================================================================

/// Non-blocking check for a terminal event, waiting at most `timeout`.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if poll(timeout)? { Ok(Some(read()?)) } else { Ok(None) }
}

// =============================================================================
// ROUTING
// =============================================================================

#[derive(Debug, Default)]
pub struct InputRouter {
    mouse: MouseTracker,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&mut self, event: Event, layout: &ViewLayout) -> InputEvent {
        let command = match event {
            Event::Key(key) => command_for_key(key),
            Event::Mouse(mouse) => self.mouse.handle(mouse, layout),
            Event::Resize(w, h) => {
                set_terminal_size(w, h);
                return InputEvent::Resize(w, h);
            }
            _ => None,
        };
        command.map_or(InputEvent::None, InputEvent::Command)
    }
}

// =============================================================================
// TESTS
// =============================================================================
