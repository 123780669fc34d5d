//! Terminal renderer.
//!
//! The renderer knows only about cells. The canvas and the panel fill a
//! [`FrameBuffer`]; [`DiffRenderer`] turns it into the smallest ANSI stream
//! that brings the terminal up to date; [`Dumper`] writes the same buffer to
//! a file.

pub mod ansi;
pub mod buffer;
pub mod canvas;
pub mod diff;
pub mod dump;
pub mod output;
pub mod panel;

pub use buffer::{char_width, string_width, FrameBuffer};
pub use canvas::Canvas;
pub use diff::DiffRenderer;
pub use dump::Dumper;
pub use output::{OutputBuffer, StatefulCellRenderer};
