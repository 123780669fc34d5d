//! xyz trajectories.
//!
//! ```text
//! 3                         <- atom count
//! step 10  time 25.0 fs     <- comment; the time precedes the delimiter token
//! Si  0.0  0.0  0.0         <- type name, then numeric columns
//! Si  1.3  1.3  1.3
//! Ge  2.7  0.0  2.7
//! ```

use std::io::BufRead;

use super::{
    frame_bounds, number_at, passes_filter, require_columns, FrameSource, Lines, ParseOptions,
    ParsedFrame,
};
use crate::error::TrajectoryError;
use crate::types::{Atom, MISSING_TIME};

/// Most distinct type names allowed in one frame.
pub const MAX_TYPES: usize = 100;

pub struct XyzSource<R> {
    lines: Lines<R>,
    options: ParseOptions,
}

impl<R: BufRead> XyzSource<R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        Self {
            lines: Lines::new(reader),
            options,
        }
    }

    fn parse_time(&self, comment: &str) -> f64 {
        let line = self.lines.line_number();
        let tokens: Vec<&str> = comment.split_whitespace().collect();
        let delim = self.options.time_delim.as_str();
        // the last delimiter on the line wins
        let Some(pos) = tokens.iter().skip(1).rposition(|t| *t == delim) else {
            log::warn!("line {line}: missing time variable (no {delim:?} token)");
            return MISSING_TIME;
        };
        // `pos` counts from the second token, so tokens[pos] precedes the delimiter.
        let token = tokens[pos];
        token.parse::<f64>().unwrap_or_else(|_| {
            log::warn!("line {line}: invalid time variable {token:?}");
            MISSING_TIME
        })
    }
}

impl<R: BufRead + Send> FrameSource for XyzSource<R> {
    fn next_frame(&mut self) -> Result<Option<ParsedFrame>, TrajectoryError> {
        let header = loop {
            match self.lines.next_line()? {
                None => return Ok(None),
                Some(l) if l.trim().is_empty() => continue,
                Some(l) => break l,
            }
        };
        let count: usize = header
            .split_whitespace()
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| TrajectoryError::MalformedHeader {
                line: self.lines.line_number(),
                text: header.clone(),
            })?;

        let Some(comment) = self.lines.next_line()? else {
            log::warn!("abnormal end of input after frame header on line {}", self.lines.line_number());
            return Ok(None);
        };
        let time = self.parse_time(&comment);

        let cols = self.options.columns;
        let needed = cols.x.max(cols.y).max(cols.z);
        let mut type_names: Vec<String> = Vec::new();
        let mut atoms = Vec::with_capacity(count);
        let mut is_last = false;

        for read in 0..count {
            let Some(text) = self.lines.next_line()? else {
                log::warn!("end of file inside frame: {read} of {count} atom lines read");
                is_last = true;
                break;
            };
            let line = self.lines.line_number();
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if !passes_filter(&tokens, self.options.filter.as_ref()) {
                continue;
            }
            require_columns(&tokens, needed, line, &text)?;

            let name = tokens[0];
            let atype = match type_names.iter().position(|n| n == name) {
                Some(id) => id,
                None => {
                    if type_names.len() == MAX_TYPES {
                        return Err(TrajectoryError::TooManyTypes { line, max: MAX_TYPES });
                    }
                    type_names.push(name.to_string());
                    type_names.len() - 1
                }
            };

            let mut atom = Atom::new(
                atoms.len(),
                number_at(&tokens, cols.x, line),
                number_at(&tokens, cols.y, line),
                number_at(&tokens, cols.z, line),
            );
            atom.atype = atype;
            atoms.push(atom);
        }

        Ok(Some(ParsedFrame {
            bounds: frame_bounds(&atoms, &self.options.axes),
            atoms,
            time,
            is_last,
            type_count: type_names.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Columns, InputFormat, LineFilter};
    use crate::types::AxisBound;
    use std::io::Cursor;

    fn options() -> ParseOptions {
        ParseOptions {
            format: InputFormat::Xyz,
            columns: Columns { x: 2, y: 3, z: 4, t: 1 },
            ..ParseOptions::default()
        }
    }

    fn source(text: &str, options: ParseOptions) -> XyzSource<Cursor<String>> {
        XyzSource::new(Cursor::new(text.to_string()), options)
    }

    #[test]
    fn test_two_frames() {
        let text = "2\nt = 1.5 fs\nSi 0 0 0\nGe 1 2 3\n\n2\nt = 2.5 fs\nSi 1 1 1\nSi 2 2 2\n";
        let mut src = source(text, options());

        let first = src.next_frame().unwrap().unwrap();
        assert_eq!(first.time, 1.5);
        assert_eq!(first.atoms.len(), 2);
        assert_eq!(first.type_count, 2);
        assert_eq!(first.atoms[1].atype, 1);
        assert_eq!((first.atoms[1].x, first.atoms[1].y, first.atoms[1].z), (1.0, 2.0, 3.0));
        assert!(!first.is_last);
        assert_eq!(first.bounds.zmax, 3.0);

        let second = src.next_frame().unwrap().unwrap();
        assert_eq!(second.time, 2.5);
        assert_eq!(second.type_count, 1);
        assert_eq!(second.bounds.xmin, 1.0);

        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_time_delimiter() {
        let mut opts = options();
        opts.time_delim = "ps".into();
        let mut src = source("1\nstep 4 time 0.25 ps\nH 0 0 0\n", opts);
        assert_eq!(src.next_frame().unwrap().unwrap().time, 0.25);
    }

    #[test]
    fn test_time_taken_before_last_delimiter() {
        let mut src = source("1\nstep 3 fs elapsed 7.5 fs\nH 0 0 0\n", options());
        assert_eq!(src.next_frame().unwrap().unwrap().time, 7.5);
    }

    #[test]
    fn test_missing_or_bad_time() {
        let mut src = source("1\nno time here\nH 0 0 0\n1\nabc fs\nH 0 0 0\n", options());
        assert_eq!(src.next_frame().unwrap().unwrap().time, MISSING_TIME);
        assert_eq!(src.next_frame().unwrap().unwrap().time, MISSING_TIME);
    }

    #[test]
    fn test_malformed_header_is_fatal() {
        let mut src = source("Si 0 0 0\n", options());
        assert!(matches!(
            src.next_frame(),
            Err(TrajectoryError::MalformedHeader { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_columns_is_fatal() {
        let mut src = source("1\n1 fs\nSi 0 0\n", options());
        assert!(matches!(
            src.next_frame(),
            Err(TrajectoryError::MissingColumns { line: 3, found: 3, needed: 4, .. })
        ));
    }

    #[test]
    fn test_bad_number_degrades() {
        let mut src = source("1\n1 fs\nSi 1 oops 3\n", options());
        let frame = src.next_frame().unwrap().unwrap();
        assert_eq!(frame.atoms[0].y, 0.0);
        assert_eq!(frame.atoms[0].z, 3.0);
    }

    #[test]
    fn test_truncated_frame_is_last() {
        let mut src = source("3\n1 fs\nSi 0 0 0\n", options());
        let frame = src.next_frame().unwrap().unwrap();
        assert!(frame.is_last);
        assert_eq!(frame.atoms.len(), 1);
    }

    #[test]
    fn test_missing_comment_ends_input() {
        let mut src = source("3\n", options());
        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_filter_skips_but_counts() {
        let mut opts = options();
        opts.filter = Some(LineFilter { column: 1, value: "Ge".into() });
        let mut src = source("3\n1 fs\nSi 0 0 0\nGe 1 1 1\nSi 2 2 2\n1\n2 fs\nGe 5 5 5\n", opts);
        let first = src.next_frame().unwrap().unwrap();
        assert_eq!(first.atoms.len(), 1);
        assert_eq!(first.atoms[0].x, 1.0);
        assert_eq!(first.atoms[0].index, 0);
        let second = src.next_frame().unwrap().unwrap();
        assert_eq!(second.time, 2.0);
    }

    #[test]
    fn test_too_many_types_is_fatal() {
        let mut text = format!("{}\n1 fs\n", MAX_TYPES + 1);
        for i in 0..=MAX_TYPES {
            text.push_str(&format!("T{i} 0 0 0\n"));
        }
        let mut src = source(&text, options());
        assert!(matches!(
            src.next_frame(),
            Err(TrajectoryError::TooManyTypes { max: MAX_TYPES, .. })
        ));
    }

    #[test]
    fn test_fixed_axis_copied() {
        let mut opts = options();
        opts.axes[0] = AxisBound::Fixed { min: -9.0, max: 9.0 };
        let mut src = source("1\n1 fs\nSi 1 2 3\n", opts);
        let frame = src.next_frame().unwrap().unwrap();
        assert_eq!((frame.bounds.xmin, frame.bounds.xmax), (-9.0, 9.0));
        assert_eq!((frame.bounds.ymin, frame.bounds.ymax), (2.0, 2.0));
    }
}
