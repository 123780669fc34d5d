//! Producer thread.
//!
//! Pulls frames from a [`FrameSource`] and publishes them into the
//! [`FrameStore`]. Blocks on back-pressure, pauses at end of input, and
//! switches sources when the session posts a [`SourceRequest`].

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::frame_store::FrameStore;
use super::swap::{FileSwap, SourceRequest};
use crate::error::TrajectoryError;
use crate::trajectory::{open_source, FrameSource, ParsedFrame};
use crate::types::Frame;

/// How long the reader sleeps between checks while it has nothing to do.
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// How long `stop` waits for the thread before detaching it.
const STOP_GRACE: Duration = Duration::from_millis(200);

/// Events from the reader thread.
#[derive(Debug)]
pub enum ReaderMessage {
    /// A requested source was opened.
    Opened(String),
    /// The source ran dry after `frames` frames.
    EndOfInput { frames: u64 },
    /// Parsing failed; the thread has stopped.
    Fatal(TrajectoryError),
}

/// Handle to the reader thread.
pub struct InputReader {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    store: Arc<FrameStore>,
    swap: Arc<FileSwap>,
}

struct ReadLoop {
    source: Box<dyn FrameSource>,
    store: Arc<FrameStore>,
    swap: Arc<FileSwap>,
    running: Arc<AtomicBool>,
    tx: Sender<ReaderMessage>,
    /// Store epoch the current source belongs to.
    epoch: u64,
    /// Frames committed from the current source.
    committed: u64,
}

impl InputReader {
    /// Spawn the reader thread on an already opened source.
    pub fn spawn(
        source: Box<dyn FrameSource>,
        store: Arc<FrameStore>,
        swap: Arc<FileSwap>,
    ) -> io::Result<(Self, Receiver<ReaderMessage>)> {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));

        let mut read_loop = ReadLoop {
            source,
            epoch: store.epoch(),
            store: Arc::clone(&store),
            swap: Arc::clone(&swap),
            running: Arc::clone(&running),
            tx,
            committed: 0,
        };

        let handle = thread::Builder::new()
            .name("trajview-reader".to_string())
            .spawn(move || {
                log::debug!("reader thread started");
                read_loop.run();
                read_loop.running.store(false, Ordering::SeqCst);
                log::debug!("reader thread stopped");
            })?;

        Ok((
            Self {
                handle: Some(handle),
                running,
                store,
                swap,
            },
            rx,
        ))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the reader thread.
    ///
    /// A thread blocked reading stdin cannot be interrupted; it is detached
    /// after a short grace period and ends with the process.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.store.close();
        self.swap.close();
        let Some(handle) = self.handle.take() else {
            return;
        };
        let deadline = Instant::now() + STOP_GRACE;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        if handle.is_finished() {
            if handle.join().is_err() {
                log::error!("reader thread panicked");
            }
        } else {
            log::debug!("reader thread still blocked on input, detaching");
        }
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.stop();
    }
}

impl ReadLoop {
    fn active(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.swap.is_closed()
    }

    fn run(&mut self) {
        while self.active() {
            if let Some(request) = self.swap.take() {
                if let Err(e) = self.switch_source(request) {
                    let _ = self.tx.send(ReaderMessage::Fatal(e));
                    return;
                }
            }

            match self.source.next_frame() {
                Err(e) => {
                    log::error!("{e}");
                    let _ = self.tx.send(ReaderMessage::Fatal(e));
                    return;
                }
                Ok(None) => self.end_of_input(),
                Ok(Some(parsed)) => {
                    if !self.publish(parsed) && self.store.is_closed() {
                        return;
                    }
                }
            }
        }
    }

    fn switch_source(&mut self, request: SourceRequest) -> Result<(), TrajectoryError> {
        let label = request.input.label();
        self.source = open_source(&request.input, &request.options)?;
        self.epoch = request.epoch;
        self.committed = 0;
        log::info!("reader switched to {label} (epoch {})", self.epoch);
        let _ = self.tx.send(ReaderMessage::Opened(label));
        Ok(())
    }

    /// Mark the previous frame as the last one and wait for a new source.
    fn end_of_input(&mut self) {
        if self.committed > 0 {
            self.store.mark_last_in_epoch(self.epoch, self.committed - 1);
        }
        log::info!("end of input after {} frames", self.committed);
        let _ = self.tx.send(ReaderMessage::EndOfInput {
            frames: self.committed,
        });
        while self.active() && !self.swap.wait_for_request(IDLE_WAIT) {}
    }

    /// Push one frame through the ring. Returns false if it was dropped.
    fn publish(&mut self, parsed: ParsedFrame) -> bool {
        let Some(mut slot) = self.store.acquire_fill_slot() else {
            return false;
        };
        if slot.epoch() != self.epoch {
            // The store was reset for a source we have not switched to yet.
            self.store.abandon_fill_slot(slot);
            self.swap.wait_for_request(IDLE_WAIT);
            return false;
        }

        let sequence = slot.sequence();
        slot.fill(Frame {
            atoms: parsed.atoms,
            bounds: parsed.bounds,
            time: parsed.time,
            sequence,
            is_last: parsed.is_last,
            type_count: parsed.type_count,
        });
        if !self.store.commit_fill_slot(slot) {
            self.swap.wait_for_request(IDLE_WAIT);
            return false;
        }
        log::trace!("committed frame {sequence}");
        self.committed += 1;
        true
    }
}
