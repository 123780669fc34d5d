//! Error types.
//!
//! Fatal conditions are typed errors; degrade-and-continue conditions (a bad
//! number, a missing timestamp) are `log::warn!` records at the point they
//! happen and never reach these enums.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems while reading a trajectory.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("cannot open input file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error on line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: malformed frame header {text:?}, expected the atom count (is the input really xyz?)")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: {found} columns but column {needed} is required: {text:?}")]
    MissingColumns {
        line: usize,
        found: usize,
        needed: usize,
        text: String,
    },

    #[error("line {line}: more than {max} distinct atom types in one frame")]
    TooManyTypes { line: usize, max: usize },
}

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} column must be at least 1")]
    ColumnOutOfRange { name: &'static str },

    #[error("{axis}min must be smaller than {axis}max")]
    InvertedBounds { axis: char },

    #[error("cube value must be larger than 0.0")]
    NonPositiveCube,

    #[error("the view area should be at least {min}x{min} cells, got {width}x{height}")]
    AreaTooSmall { width: u16, height: u16, min: u16 },

    #[error("ring capacity must be at least 2, got {0}")]
    CapacityTooSmall(usize),

    #[error("minimum frame interval must be finite and non-negative")]
    InvalidInterval,
}

/// Everything that can end a viewer session.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("reader thread stopped unexpectedly")]
    ReaderGone,
}
