//! Per-frame ANSI snapshots.
//!
//! Each newly displayed frame can be written to `NAME-<time>.ans` or
//! `NAME-<frame>.ans`. Replay one with `cat`.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::buffer::FrameBuffer;
use super::output::{OutputBuffer, StatefulCellRenderer};
use crate::config::{DumpNaming, DumpTarget};

pub struct Dumper {
    target: DumpTarget,
    output: OutputBuffer,
    renderer: StatefulCellRenderer,
}

impl Dumper {
    pub fn new(target: DumpTarget) -> Self {
        Self {
            target,
            output: OutputBuffer::new(),
            renderer: StatefulCellRenderer::new(),
        }
    }

    pub fn file_name(&self, sequence: u64, time: f64) -> PathBuf {
        match self.target.naming {
            DumpNaming::BySequence => format!("{}-{}.ans", self.target.name, sequence),
            DumpNaming::ByTime => format!("{}-{:5.3}.ans", self.target.name, time),
        }
        .into()
    }

    /// Write `buffer` as the snapshot of one frame.
    pub fn write(&mut self, buffer: &FrameBuffer, sequence: u64, time: f64) -> io::Result<PathBuf> {
        let path = self.file_name(sequence, time);
        self.output.clear();
        self.renderer.render_lines(&mut self.output, buffer);
        fs::write(&path, self.output.as_bytes())?;
        log::debug!("dumped frame {sequence} to {}", path.display());
        Ok(path)
    }
}

// =============================================================================
// Tests
// =============================================================================
