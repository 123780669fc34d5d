//! Viewer setup and the main loop.
//!
//! ```text
//!  reader thread                         UI thread (this module)
//!  ─────────────                         ───────────────────────
//!  FrameSource ──parse──▶ FrameStore ──▶ Session::tick ──▶ Canvas + panel
//!       ▲                    ring           ▲      │             │
//!       │                                   │      ▼             ▼
//!  FileSwap ◀────────── restart ────────── Command          FrameBuffer
//!                                           ▲                    │
//!  ReaderMessage ──mpsc──▶ drain            │                    ▼
//!                                     crossterm events      DiffRenderer
//! ```
//!
//! The loop is cooperative and never blocks for long: each pass polls the
//! terminal for a few milliseconds, feeds any command to the session, ticks
//! it, drains reader messages, and repaints if something changed.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::frame_store::FrameStore;
use super::reader::{InputReader, ReaderMessage};
use super::session::{Command, Session, TickOutcome};
use super::swap::FileSwap;
use super::terminal::{detect_terminal_size, TerminalSetup, ViewLayout};
use crate::config::Configuration;
use crate::error::ViewerError;
use crate::input::{poll_event, InputEvent, InputRouter};
use crate::renderer::{panel, Canvas, DiffRenderer, Dumper, FrameBuffer};
use crate::trajectory::{open_source, ParseOptions};

/// How long one loop pass waits for terminal input.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Upper bound on events handled before the session gets a tick.
const MAX_EVENTS_PER_PASS: usize = 64;

// =============================================================================
// Viewer
// =============================================================================

/// A running viewer: reader thread, session, and the screen it paints.
///
/// `new` and [`step`](Self::step) never touch the terminal, so the whole
/// pipeline can be driven headless; [`run`](Self::run) adds fullscreen
/// setup and the input loop.
pub struct Viewer {
    session: Session,
    reader: InputReader,
    messages: Receiver<ReaderMessage>,
    router: InputRouter,
    layout: ViewLayout,
    buffer: FrameBuffer,
    renderer: DiffRenderer,
    dumper: Option<Dumper>,
    end_reported: bool,
    /// The buffer changed since it was last sent to the terminal.
    unsent: bool,
}

impl Viewer {
    /// Open the input and start the reader. Fails if the input cannot be
    /// opened or the configuration is invalid.
    pub fn new(config: Configuration) -> Result<Self, ViewerError> {
        config.validate()?;
        let source = open_source(&config.input, &ParseOptions::from_config(&config))?;
        log::info!("reading {}", config.input.label());

        let store = Arc::new(FrameStore::new(config.capacity));
        let swap = Arc::new(FileSwap::new());
        let (reader, messages) = InputReader::spawn(source, Arc::clone(&store), Arc::clone(&swap))?;

        let layout = ViewLayout::current(config.area);
        let dumper = config.dump.clone().map(Dumper::new);
        let mut session = Session::new(config, store, swap);
        session.set_area(layout.area.width, layout.area.height);

        Ok(Self {
            session,
            reader,
            messages,
            router: InputRouter::new(),
            buffer: FrameBuffer::new(layout.screen.0, layout.screen.1),
            layout,
            renderer: DiffRenderer::new(),
            dumper,
            end_reported: false,
            unsent: true,
        })
    }

    /// Run a viewer in fullscreen until the user quits, once-mode finishes,
    /// or the reader fails. The terminal is restored on every path.
    pub fn run(config: Configuration) -> Result<(), ViewerError> {
        let title = format!("trajview: {}", config.input.label());
        let mut viewer = Self::new(config)?;

        let mut terminal = TerminalSetup::new();
        terminal.enter_fullscreen(&title)?;
        detect_terminal_size();
        viewer.relayout();

        let result = viewer.event_loop();
        viewer.reader.stop();
        terminal.exit_fullscreen()?;
        result
    }

    fn event_loop(&mut self) -> Result<(), ViewerError> {
        loop {
            let mut timeout = POLL_INTERVAL;
            for _ in 0..MAX_EVENTS_PER_PASS {
                let Some(event) = poll_event(timeout)? else {
                    break;
                };
                timeout = Duration::ZERO;
                match self.router.route(event, &self.layout) {
                    InputEvent::Command(command) => self.handle(command),
                    InputEvent::Resize(..) => self.relayout(),
                    InputEvent::None => {}
                }
                if self.session.should_quit() {
                    break;
                }
            }

            let outcome = self.step(Instant::now())?;
            self.present()?;
            if outcome == TickOutcome::Quit {
                log::info!("quitting");
                return Ok(());
            }
        }
    }

    // =========================================================================
    // Headless pipeline
    // =========================================================================

    /// Feed a command to the session.
    pub fn handle(&mut self, command: Command) {
        self.session.handle(command);
        // config changes may carry a stale requested area
        self.session.set_area(self.layout.area.width, self.layout.area.height);
    }

    /// One pass without terminal I/O: tick, drain reader messages, compose.
    pub fn step(&mut self, now: Instant) -> Result<TickOutcome, ViewerError> {
        let outcome = self.session.tick(now);
        self.drain_messages()?;
        if self.compose() && self.session.take_fresh_frame() {
            self.dump();
        }
        Ok(outcome)
    }

    fn drain_messages(&mut self) -> Result<(), ViewerError> {
        loop {
            match self.messages.try_recv() {
                Ok(ReaderMessage::Opened(label)) => {
                    log::debug!("now reading {label}");
                    self.end_reported = false;
                }
                Ok(ReaderMessage::EndOfInput { frames }) => {
                    if frames == 0 {
                        log::warn!("input contained no frames");
                    }
                    self.end_reported = true;
                }
                Ok(ReaderMessage::Fatal(e)) => return Err(e.into()),
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => {
                    return if self.reader.is_running() || self.end_reported {
                        Ok(())
                    } else {
                        Err(ViewerError::ReaderGone)
                    };
                }
            }
        }
    }

    /// Repaint the frame buffer if the session asks for it.
    /// Returns true when something was painted.
    fn compose(&mut self) -> bool {
        let clear = self.session.take_clear();
        let dirty = self.session.take_dirty();
        if !clear && !dirty {
            return false;
        }

        let canvas = Canvas::new(self.layout.area);
        let config = self.session.config();
        if clear {
            canvas.clear(&mut self.buffer, config.white_background);
        }
        if let Some(projection) = self.session.projection() {
            canvas.draw(&mut self.buffer, projection, self.session.colormap(), config.mode);
        }
        panel::draw(&mut self.buffer, self.layout.panel, &self.session.status(), config);
        self.unsent = true;
        true
    }

    fn dump(&mut self) {
        let (Some(dumper), Some(current)) = (self.dumper.as_mut(), self.session.current()) else {
            return;
        };
        if let Err(e) = dumper.write(&self.buffer, current.seq, current.frame.time) {
            log::warn!("cannot write snapshot of frame {}: {e}", current.seq);
        }
    }

    fn present(&mut self) -> Result<(), ViewerError> {
        if std::mem::take(&mut self.unsent) {
            self.renderer.render(&self.buffer)?;
        }
        Ok(())
    }

    /// Recompute the layout from the terminal size signals.
    fn relayout(&mut self) {
        let layout = ViewLayout::current(self.session.config().area);
        if layout == self.layout {
            return;
        }
        log::debug!("view area now {}x{}", layout.area.width, layout.area.height);
        self.layout = layout;
        self.buffer.resize(layout.screen.0, layout.screen.1);
        self.session.set_area(layout.area.width, layout.area.height);
        self.session.request_clear();
        self.renderer.invalidate();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn layout(&self) -> &ViewLayout {
        &self.layout
    }
}
