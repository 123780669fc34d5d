//! Trajectory sources.
//!
//! A [`FrameSource`] turns a text stream into [`ParsedFrame`]s. Two formats
//! exist: xyz files with a count/comment header per frame, and plain columnar
//! files where frames are runs of lines sharing the same time value.
//!
//! Parsers are lenient about numbers and strict about structure: an
//! unparsable coordinate is logged and read as 0.0, while a line with too few
//! columns ends the session.

mod columnar;
mod xyz;

pub use columnar::ColumnarSource;
pub use xyz::{XyzSource, MAX_TYPES};

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use crate::config::{Columns, Configuration, InputFormat, InputSpec, LineFilter};
use crate::error::TrajectoryError;
use crate::types::{Atom, AxisBound, Bounds, BoundsAccumulator};

/// One frame as produced by a parser, before it gets a sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFrame {
    pub atoms: Vec<Atom>,
    pub bounds: Bounds,
    pub time: f64,
    /// The parser hit end of input while reading this frame.
    pub is_last: bool,
    pub type_count: usize,
}

/// Everything a parser needs from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub format: InputFormat,
    pub columns: Columns,
    pub filter: Option<LineFilter>,
    pub time_delim: String,
    pub axes: [AxisBound; 3],
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_config(&Configuration::default())
    }
}

impl ParseOptions {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            format: config.format,
            columns: config.columns,
            filter: config.filter.clone(),
            time_delim: config.time_delim.clone(),
            axes: config.axes,
        }
    }
}

/// A producer of frames.
pub trait FrameSource: Send {
    /// The next frame, `Ok(None)` at end of input.
    fn next_frame(&mut self) -> Result<Option<ParsedFrame>, TrajectoryError>;
}

/// Open `input` with the parser selected by `options`.
pub fn open_source(
    input: &InputSpec,
    options: &ParseOptions,
) -> Result<Box<dyn FrameSource>, TrajectoryError> {
    let reader: Box<dyn BufRead + Send> = match input {
        InputSpec::Path(path) => {
            let file = File::open(path).map_err(|source| TrajectoryError::Open {
                path: path.clone(),
                source,
            })?;
            Box::new(BufReader::new(file))
        }
        InputSpec::Stdin => Box::new(BufReader::new(io::stdin())),
    };
    log::info!("opened {} as {:?}", input.label(), options.format);
    Ok(from_reader(reader, options.clone()))
}

/// Wrap any buffered reader in the parser selected by `options`.
pub fn from_reader<R>(reader: R, options: ParseOptions) -> Box<dyn FrameSource>
where
    R: BufRead + Send + 'static,
{
    match options.format {
        InputFormat::Xyz => Box::new(XyzSource::new(reader, options)),
        InputFormat::Columnar => Box::new(ColumnarSource::new(reader, options)),
    }
}

// =============================================================================
// Shared line handling
// =============================================================================

/// Line reader that counts lines for error messages.
struct Lines<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Next line without its terminator, `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, TrajectoryError> {
        self.buf.clear();
        let n = self
            .reader
            .read_line(&mut self.buf)
            .map_err(|source| TrajectoryError::Io {
                line: self.line + 1,
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(self.buf.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn line_number(&self) -> usize {
        self.line
    }
}

/// The filter rejects lines whose filter column differs (or is missing).
fn passes_filter(tokens: &[&str], filter: Option<&LineFilter>) -> bool {
    match filter {
        None => true,
        Some(f) => f
            .column
            .checked_sub(1)
            .and_then(|i| tokens.get(i))
            .is_some_and(|t| *t == f.value),
    }
}

fn require_columns(
    tokens: &[&str],
    needed: usize,
    line: usize,
    text: &str,
) -> Result<(), TrajectoryError> {
    if tokens.len() < needed {
        return Err(TrajectoryError::MissingColumns {
            line,
            found: tokens.len(),
            needed,
            text: text.to_string(),
        });
    }
    Ok(())
}

/// Parse the 1-based `column`, warning and falling back to 0.0.
/// Callers check the column count first.
fn number_at(tokens: &[&str], column: usize, line: usize) -> f64 {
    let token = tokens[column - 1];
    match token.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            log::warn!("line {line}: cannot convert {token:?} to a number, using 0.0");
            0.0
        }
    }
}

fn frame_bounds(atoms: &[Atom], axes: &[AxisBound; 3]) -> Bounds {
    let mut acc = BoundsAccumulator::new();
    for a in atoms {
        acc.add(a.x, a.y, a.z);
    }
    acc.finish().unwrap_or_default().resolve(axes)
}
