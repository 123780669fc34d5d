//! Command line.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::colormap::Palette;
use crate::config::{
    Columns, Configuration, DrawMode, DumpNaming, DumpTarget, InputFormat, InputSpec, LineFilter,
    SizeVariation, SortDirection,
};
use crate::error::ConfigError;
use crate::types::AxisBound;

#[derive(Parser, Debug)]
#[command(
    name = "trajview",
    version,
    about = "Animate particle trajectories in the terminal",
    after_help = "Columns are 1-based. FILE '_' reads stdin. With --xyz the t column is ignored.\n\
                  Bounds not fixed with --cube or -x/-y/-z follow the data of each frame."
)]
pub struct Cli {
    /// Column holding x
    pub xcol: usize,

    /// Column holding y
    pub ycol: usize,

    /// Column holding z
    pub zcol: usize,

    /// Column holding the time (frames are runs of equal time)
    pub tcol: usize,

    /// Input file, `_` for stdin
    pub file: String,

    /// View area size in cells (default: fit the terminal)
    #[arg(long, num_args = 2, value_names = ["W", "H"])]
    pub size: Option<Vec<u16>>,

    /// Fix every axis not set individually to [-D, D]
    #[arg(long, value_name = "D")]
    pub cube: Option<f64>,

    /// Fixed x bounds
    #[arg(short = 'x', num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub x: Option<Vec<f64>>,

    /// Fixed y bounds
    #[arg(short = 'y', num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub y: Option<Vec<f64>>,

    /// Fixed z bounds
    #[arg(short = 'z', num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub z: Option<Vec<f64>>,

    #[arg(long, value_enum, default_value_t = ModeArg::Circle)]
    pub mode: ModeArg,

    /// Atom radius in cells (clamped to 2..=25)
    #[arg(long, default_value_t = 2)]
    pub radius: u16,

    /// Minimum time between frames, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, allow_negative_numbers = true)]
    pub sleep: f64,

    /// Wait for space or a middle click after each frame
    #[arg(long)]
    pub bsleep: bool,

    /// Clear the area before each frame instead of leaving trails
    #[arg(long)]
    pub erase: bool,

    /// White background
    #[arg(long)]
    pub white: bool,

    /// Only use lines whose column COL equals STRING
    #[arg(long, num_args = 2, value_names = ["COL", "STRING"])]
    pub filter: Option<Vec<String>>,

    #[arg(long, value_enum, default_value_t = PaletteArg::Default)]
    pub palette: PaletteArg,

    /// Scale atoms with their depth
    #[arg(long, value_enum)]
    pub vary: Option<VaryArg>,

    /// Draw nearer atoms first
    #[arg(long)]
    pub sort_reverse: bool,

    /// Color by atom type (xyz only)
    #[arg(long)]
    pub use_types: bool,

    /// Token after the time value on xyz comment lines
    #[arg(long, value_name = "S", default_value = "fs")]
    pub time_delim: String,

    /// Write every displayed frame to NAME-<time>.ans
    #[arg(long, value_name = "NAME")]
    pub dump: Option<String>,

    /// Name dumped frames by frame number
    #[arg(long, requires = "dump")]
    pub dump_num: bool,

    /// Exit after the last frame
    #[arg(long)]
    pub once: bool,

    /// Initial rotation in degrees
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub rotate: Option<Vec<f64>>,

    /// Input is xyz
    #[arg(long)]
    pub xyz: bool,

    /// Frames buffered between reader and display
    #[arg(long, default_value_t = crate::config::DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Write the log here instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Rect,
    Circle,
    Ball,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteArg {
    Default,
    Inverted,
    Cold,
    Cold2,
    Greyscale,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaryArg {
    Decrease,
    Increase,
}

impl From<ModeArg> for DrawMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Rect => DrawMode::Rectangle,
            ModeArg::Circle => DrawMode::Circle,
            ModeArg::Ball => DrawMode::Ball,
        }
    }
}

impl From<PaletteArg> for Palette {
    fn from(palette: PaletteArg) -> Self {
        match palette {
            PaletteArg::Default => Palette::Default,
            PaletteArg::Inverted => Palette::Inverted,
            PaletteArg::Cold => Palette::Cold,
            PaletteArg::Cold2 => Palette::Cold2,
            PaletteArg::Greyscale => Palette::Greyscale,
        }
    }
}

fn fixed(pair: &Option<Vec<f64>>) -> Option<AxisBound> {
    match pair.as_deref() {
        Some(&[min, max]) => Some(AxisBound::Fixed { min, max }),
        _ => None,
    }
}

impl Cli {
    /// Build and validate the configuration these arguments describe.
    pub fn to_config(&self) -> Result<Configuration, ConfigError> {
        let mut config = Configuration::default();
        if let Some(extent) = self.cube {
            config = config.with_cube(extent)?;
        }
        for (axis, pair) in [&self.x, &self.y, &self.z].into_iter().enumerate() {
            if let Some(bound) = fixed(pair) {
                config.axes[axis] = bound;
            }
        }

        config.input = InputSpec::from_arg(&self.file);
        config.format = if self.xyz { InputFormat::Xyz } else { InputFormat::Columnar };
        config.columns = Columns {
            x: self.xcol,
            y: self.ycol,
            z: self.zcol,
            t: self.tcol,
        };
        config.filter = match self.filter.as_deref() {
            Some([column, value]) => Some(LineFilter {
                column: column.parse().map_err(|_| ConfigError::ColumnOutOfRange { name: "filter" })?,
                value: value.clone(),
            }),
            _ => None,
        };
        config.time_delim = self.time_delim.clone();
        config.area = match self.size.as_deref() {
            Some(&[w, h]) => Some((w, h)),
            _ => None,
        };
        config.mode = self.mode.into();
        config = config.with_radius(self.radius);
        config.palette = self.palette.into();
        config.vary = match self.vary {
            None => SizeVariation::Constant,
            Some(VaryArg::Decrease) => SizeVariation::DecreaseWithDepth,
            Some(VaryArg::Increase) => SizeVariation::IncreaseWithDepth,
        };
        config.sort = if self.sort_reverse { SortDirection::Reverse } else { SortDirection::Forward };
        config.use_types = self.use_types;
        if self.use_types && !self.xyz {
            log::info!("--use-types only applies to xyz input, ignoring it");
        }
        config.interval = Duration::try_from_secs_f64(self.sleep).map_err(|_| ConfigError::InvalidInterval)?;
        config.manual_advance = self.bsleep;
        config.erase = self.erase;
        config.white_background = self.white;
        config.once = self.once;
        config.dump = self.dump.clone().map(|name| DumpTarget {
            name,
            naming: if self.dump_num { DumpNaming::BySequence } else { DumpNaming::ByTime },
        });
        if let Some(&[x, y, z]) = self.rotate.as_deref() {
            config.initial_rotation = [x, y, z];
        }
        config.capacity = self.capacity;

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
