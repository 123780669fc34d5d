//! Columnar trajectories: whitespace-separated numbers, one atom per line.
//! Consecutive lines with the same time column form a frame.

use std::io::BufRead;

use super::{
    frame_bounds, number_at, passes_filter, require_columns, FrameSource, Lines, ParseOptions,
    ParsedFrame,
};
use crate::error::TrajectoryError;
use crate::types::Atom;

/// A line already split into the numbers we care about.
#[derive(Debug, Clone, Copy)]
struct Row {
    x: f64,
    y: f64,
    z: f64,
    t: f64,
}

pub struct ColumnarSource<R> {
    lines: Lines<R>,
    options: ParseOptions,
    /// First row of the next frame, read while closing the previous one.
    carry: Option<Row>,
    exhausted: bool,
}

impl<R: BufRead> ColumnarSource<R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        Self {
            lines: Lines::new(reader),
            options,
            carry: None,
            exhausted: false,
        }
    }

    /// Next row that passes the filter, `None` at end of input.
    fn next_row(&mut self) -> Result<Option<Row>, TrajectoryError> {
        let cols = self.options.columns;
        let needed = cols.x.max(cols.y).max(cols.z).max(cols.t);
        while let Some(text) = self.lines.next_line()? {
            let line = self.lines.line_number();
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.is_empty() || !passes_filter(&tokens, self.options.filter.as_ref()) {
                continue;
            }
            require_columns(&tokens, needed, line, &text)?;
            return Ok(Some(Row {
                x: number_at(&tokens, cols.x, line),
                y: number_at(&tokens, cols.y, line),
                z: number_at(&tokens, cols.z, line),
                t: number_at(&tokens, cols.t, line),
            }));
        }
        Ok(None)
    }
}

impl<R: BufRead + Send> FrameSource for ColumnarSource<R> {
    fn next_frame(&mut self) -> Result<Option<ParsedFrame>, TrajectoryError> {
        if self.exhausted {
            return Ok(None);
        }
        let first = match self.carry.take() {
            Some(row) => row,
            None => match self.next_row()? {
                Some(row) => row,
                None => {
                    self.exhausted = true;
                    return Ok(None);
                }
            },
        };

        let mut rows = vec![first];
        let mut is_last = false;
        loop {
            match self.next_row()? {
                Some(row) if row.t == first.t => rows.push(row),
                Some(row) => {
                    self.carry = Some(row);
                    break;
                }
                None => {
                    self.exhausted = true;
                    is_last = true;
                    break;
                }
            }
        }

        let time = rows.last().map_or(first.t, |r| r.t);
        let atoms: Vec<Atom> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| Atom {
                time: Some(r.t),
                ..Atom::new(i, r.x, r.y, r.z)
            })
            .collect();

        Ok(Some(ParsedFrame {
            bounds: frame_bounds(&atoms, &self.options.axes),
            atoms,
            time,
            is_last,
            type_count: 1,
        }))
    }
}
