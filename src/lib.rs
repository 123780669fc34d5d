//! # trajview
//!
//! Terminal viewer for particle trajectory animations.
//!
//! ## Architecture
//!
//! Two threads share a fixed ring of frame slots. The reader thread parses
//! the input (columnar or xyz) and fills slots, blocking when the ring is
//! full. The UI thread takes one frame per tick, rotates and projects it,
//! paints it into a cell buffer, and sends only the changed cells to the
//! terminal:
//!
//! ```text
//! FrameSource → InputReader → FrameStore → Session → Canvas → DiffRenderer
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Atoms, frames, bounds, and terminal cells
//! - [`trajectory`] - Columnar and xyz parsers
//! - [`pipeline`] - Ring buffer, reader thread, session, viewer loop
//! - [`orientation`] - Accumulated rotation and Euler angle recovery
//! - [`projector`] - Rotation, depth sort, color buckets, cell mapping
//! - [`colormap`] - The five palettes
//! - [`renderer`] - Frame buffer, canvas, status panel, ANSI output
//! - [`input`] - Keyboard and mouse bindings
//! - [`config`] / [`cli`] - Configuration and the command line

pub mod cli;
pub mod colormap;
pub mod config;
pub mod error;
pub mod input;
pub mod orientation;
pub mod pipeline;
pub mod projector;
pub mod renderer;
pub mod trajectory;
pub mod types;

pub use colormap::{Colormap, Palette};
pub use config::Configuration;
pub use error::{ConfigError, TrajectoryError, ViewerError};
pub use orientation::{EulerAngles, OrientationState};
pub use pipeline::{FrameStore, Session, Viewer};
pub use types::{Atom, Bounds, Frame};
