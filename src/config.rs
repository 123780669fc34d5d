//! Session configuration.
//!
//! A [`Configuration`] is a plain value. The session never edits one in place:
//! runtime changes build a modified copy and hand it to
//! [`Session::apply_config`](crate::pipeline::session::Session::apply_config).

use std::path::PathBuf;
use std::time::Duration;

use crate::colormap::Palette;
use crate::error::ConfigError;
use crate::types::AxisBound;

/// Smallest usable view area edge, in cells.
pub const MIN_AREA: u16 = 10;

pub const MIN_RADIUS: u16 = 2;
pub const MAX_RADIUS: u16 = 25;

pub const DEFAULT_CAPACITY: usize = 8;

// =============================================================================
// Selectors
// =============================================================================

/// How a single atom is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    Rectangle,
    #[default]
    Circle,
    /// Shaded sphere.
    Ball,
}

impl DrawMode {
    pub fn next(self) -> Self {
        match self {
            DrawMode::Rectangle => DrawMode::Circle,
            DrawMode::Circle => DrawMode::Ball,
            DrawMode::Ball => DrawMode::Rectangle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DrawMode::Rectangle => "rect",
            DrawMode::Circle => "circle",
            DrawMode::Ball => "ball",
        }
    }
}

/// Radius scaling with original z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeVariation {
    #[default]
    Constant,
    /// Atoms further back (lower z) shrink.
    DecreaseWithDepth,
    /// Atoms further back (lower z) grow.
    IncreaseWithDepth,
}

impl SizeVariation {
    pub fn next(self) -> Self {
        match self {
            SizeVariation::Constant => SizeVariation::DecreaseWithDepth,
            SizeVariation::DecreaseWithDepth => SizeVariation::IncreaseWithDepth,
            SizeVariation::IncreaseWithDepth => SizeVariation::Constant,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SizeVariation::Constant => "none",
            SizeVariation::DecreaseWithDepth => "decrease",
            SizeVariation::IncreaseWithDepth => "increase",
        }
    }
}

/// Depth sort direction. Forward paints back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Forward,
    Reverse,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Forward => SortDirection::Reverse,
            SortDirection::Reverse => SortDirection::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Lines grouped into frames by the time column.
    #[default]
    Columnar,
    Xyz,
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    Path(PathBuf),
    Stdin,
}

impl InputSpec {
    /// `_` selects stdin, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "_" {
            InputSpec::Stdin
        } else {
            InputSpec::Path(PathBuf::from(arg))
        }
    }

    pub fn label(&self) -> String {
        match self {
            InputSpec::Path(p) => p.display().to_string(),
            InputSpec::Stdin => "<stdin>".to_string(),
        }
    }
}

/// 1-based column indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub t: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self { x: 1, y: 2, z: 3, t: 4 }
    }
}

/// Keep only lines whose `column` (1-based) equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFilter {
    pub column: usize,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpNaming {
    /// `NAME-<time>.ans`
    #[default]
    ByTime,
    /// `NAME-<sequence>.ans`
    BySequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpTarget {
    pub name: String,
    pub naming: DumpNaming,
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub input: InputSpec,
    pub format: InputFormat,
    pub columns: Columns,
    pub filter: Option<LineFilter>,
    /// Token following the timestamp on an xyz comment line.
    pub time_delim: String,
    /// x, y, z bound rules.
    pub axes: [AxisBound; 3],
    /// View area in cells; `None` fits the terminal.
    pub area: Option<(u16, u16)>,
    pub mode: DrawMode,
    pub radius: u16,
    pub palette: Palette,
    pub vary: SizeVariation,
    pub sort: SortDirection,
    pub use_types: bool,
    /// Minimum time between two displayed frames.
    pub interval: Duration,
    pub manual_advance: bool,
    pub erase: bool,
    pub white_background: bool,
    pub once: bool,
    pub dump: Option<DumpTarget>,
    /// Initial rotation about x, y, z in degrees.
    pub initial_rotation: [f64; 3],
    pub capacity: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            input: InputSpec::Stdin,
            format: InputFormat::Columnar,
            columns: Columns::default(),
            filter: None,
            time_delim: "fs".to_string(),
            axes: [AxisBound::Auto; 3],
            area: None,
            mode: DrawMode::Circle,
            radius: MIN_RADIUS,
            palette: Palette::Default,
            vary: SizeVariation::Constant,
            sort: SortDirection::Forward,
            use_types: false,
            interval: Duration::ZERO,
            manual_advance: false,
            erase: false,
            white_background: false,
            once: false,
            dump: None,
            initial_rotation: [0.0; 3],
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Configuration {
    /// Check every value a user can get wrong.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cols = [
            ("x", self.columns.x),
            ("y", self.columns.y),
            ("z", self.columns.z),
            ("t", self.columns.t),
        ];
        for (name, col) in cols {
            if col < 1 {
                return Err(ConfigError::ColumnOutOfRange { name });
            }
        }
        if let Some(filter) = &self.filter {
            if filter.column < 1 {
                return Err(ConfigError::ColumnOutOfRange { name: "filter" });
            }
        }

        for (axis, bound) in ['x', 'y', 'z'].into_iter().zip(self.axes.iter()) {
            if let AxisBound::Fixed { min, max } = *bound {
                if !(min < max) {
                    return Err(ConfigError::InvertedBounds { axis });
                }
            }
        }

        if let Some((width, height)) = self.area {
            if width < MIN_AREA || height < MIN_AREA {
                return Err(ConfigError::AreaTooSmall { width, height, min: MIN_AREA });
            }
        }

        if self.capacity < 2 {
            return Err(ConfigError::CapacityTooSmall(self.capacity));
        }

        Ok(())
    }

    /// Fix every axis to `[-extent, extent]`.
    pub fn with_cube(mut self, extent: f64) -> Result<Self, ConfigError> {
        if !(extent > 0.0) {
            return Err(ConfigError::NonPositiveCube);
        }
        self.axes = [AxisBound::Fixed { min: -extent, max: extent }; 3];
        Ok(self)
    }

    /// Set the radius, clamped into the supported range.
    pub fn with_radius(mut self, radius: u16) -> Self {
        self.radius = radius.clamp(MIN_RADIUS, MAX_RADIUS);
        self
    }

    /// Type coloring only means something for xyz input.
    pub fn effective_use_types(&self) -> bool {
        self.use_types && self.format == InputFormat::Xyz
    }

    /// True when switching from `self` to `other` needs the input re-read.
    pub fn needs_restart(&self, other: &Configuration) -> bool {
        self.input != other.input
            || self.format != other.format
            || self.columns != other.columns
            || self.filter != other.filter
            || self.time_delim != other.time_delim
            || self.axes != other.axes
    }
}

// =============================================================================
// Tests
// =============================================================================
