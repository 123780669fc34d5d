//! Frame pipeline
//!
//! Connects the reader thread to the terminal.
//!
//! ```text
//! FrameSource → InputReader → FrameStore → Session → Canvas → DiffRenderer
//! ```
//!
//! ## Data Flow
//!
//! 1. **reader** - parses frames on its own thread, blocks on back-pressure
//! 2. **frame_store** - fixed ring of slots shared by exactly two threads
//! 3. **session** - paces, pauses, rotates, and projects on the UI thread
//! 4. **setup** - the viewer loop: input, tick, paint, present
//!
//! **swap** carries restart requests back to the reader; **terminal** owns
//! the size signals and the fullscreen modes.

pub mod frame_store;
pub mod reader;
pub mod session;
pub mod setup;
pub mod swap;
pub mod terminal;

pub use frame_store::{FillSlot, FrameStore, RenderSlot, SlotState};
pub use reader::{InputReader, ReaderMessage};
pub use session::{Command, CurrentFrame, Session, Status, TickOutcome};
pub use setup::Viewer;
pub use swap::{FileSwap, SourceRequest};
pub use terminal::{set_terminal_size, terminal_height, terminal_width, TerminalSetup, ViewLayout};
