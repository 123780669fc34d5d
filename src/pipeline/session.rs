//! Consumer side of the pipeline.
//!
//! The session runs on the UI thread and never blocks. Each [`Session::tick`]
//! decides whether a new frame may be shown (pacing, pause, manual advance),
//! pulls it from the ring if one is ready, and runs the render cycle:
//! fold pending rotations into the orientation, recover display angles, and
//! project the frame. The slot goes back to the reader immediately; the
//! session keeps its own `Arc` of the frame for redraws.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::frame_store::FrameStore;
use super::swap::{FileSwap, SourceRequest};
use crate::colormap::Colormap;
use crate::config::{Configuration, InputSpec};
use crate::orientation::{drag_delta, Axis, EulerAngles, OrientationState};
use crate::projector::{project, screen, Projection};
use crate::trajectory::ParseOptions;
use crate::types::{Bounds, Frame};

/// Interval change per `<`/`>` key press.
pub const INTERVAL_STEP: Duration = Duration::from_millis(20);

/// Everything the UI can ask of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Rotate about a world axis by `degrees`.
    Rotate { axis: Axis, degrees: f64 },
    /// Mouse drag by a cell delta (press position minus current position).
    Drag { dx: i32, dy: i32 },
    /// Pointer moved to a cell of the view area.
    Cursor { x: u16, y: u16 },
    /// Pointer left the view area.
    CursorLeft,
    ResetOrientation,
    TogglePause,
    Advance,
    Restart,
    Quit,
    CyclePalette,
    CycleDrawMode,
    CycleSizeVariation,
    ToggleSort,
    ToggleTypes,
    ToggleErase,
    ToggleBackground,
    /// Grow (positive) or shrink (negative) the atom radius.
    Radius(i16),
    Faster,
    Slower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Rendered,
    Quit,
}

/// The frame currently on screen.
#[derive(Debug, Clone)]
pub struct CurrentFrame {
    pub seq: u64,
    pub frame: Arc<Frame>,
    pub is_last: bool,
}

/// Snapshot for the status panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub time: Option<f64>,
    pub sequence: Option<u64>,
    pub atoms: usize,
    pub angles: EulerAngles,
    pub bounds: Option<Bounds>,
    /// Data coordinates under the pointer.
    pub cursor: Option<(f64, f64)>,
    pub paused: bool,
    pub manual: bool,
    pub at_end: bool,
}

pub struct Session {
    config: Configuration,
    colormap: Colormap,
    orientation: OrientationState,
    angles: EulerAngles,
    store: Arc<FrameStore>,
    swap: Arc<FileSwap>,
    current: Option<CurrentFrame>,
    projection: Option<Projection>,
    area: (u16, u16),
    cursor: Option<(u16, u16)>,
    last_gate: Option<Instant>,
    paused: bool,
    advance: bool,
    quit: bool,
    dirty: bool,
    clear: bool,
    fresh_frame: bool,
}

impl Session {
    pub fn new(config: Configuration, store: Arc<FrameStore>, swap: Arc<FileSwap>) -> Self {
        let mut orientation = OrientationState::new();
        let [rx, ry, rz] = config.initial_rotation;
        orientation.set_button_delta(Axis::X, rx);
        orientation.set_button_delta(Axis::Y, ry);
        orientation.set_button_delta(Axis::Z, rz);

        Self {
            colormap: Colormap::new(config.palette),
            area: config.area.unwrap_or((crate::config::MIN_AREA, crate::config::MIN_AREA)),
            config,
            orientation,
            angles: EulerAngles::default(),
            store,
            swap,
            current: None,
            projection: None,
            cursor: None,
            last_gate: None,
            paused: false,
            advance: false,
            quit: false,
            dirty: true,
            clear: true,
            fresh_frame: false,
        }
    }

    // =========================================================================
    // Frame pacing
    // =========================================================================

    /// One pass of the cooperative loop. Never blocks.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.quit {
            return TickOutcome::Quit;
        }

        if let Some(last) = self.last_gate {
            if now.saturating_duration_since(last) < self.config.interval {
                return TickOutcome::Idle;
            }
        }
        self.last_gate = Some(now);

        if self.paused || (self.config.manual_advance && !self.advance) {
            return TickOutcome::Idle;
        }
        self.advance = false;

        let at_end = self.refresh_last();
        if self.config.once && at_end {
            log::info!("last frame shown, quitting");
            self.quit = true;
            return TickOutcome::Quit;
        }
        if at_end {
            return TickOutcome::Idle;
        }

        let Some(slot) = self.store.acquire_render_slot() else {
            return TickOutcome::Idle;
        };
        self.current = Some(CurrentFrame {
            seq: slot.seq,
            frame: Arc::clone(&slot.frame),
            is_last: slot.is_last,
        });
        self.render_cycle();
        self.store.release_render_slot();
        self.fresh_frame = true;
        if self.config.erase {
            self.clear = true;
        }
        TickOutcome::Rendered
    }

    /// Pick up an end-of-input mark set after the current frame was taken.
    fn refresh_last(&mut self) -> bool {
        match self.current.as_mut() {
            Some(cur) => {
                if !cur.is_last && self.store.is_last(cur.seq) {
                    cur.is_last = true;
                    self.dirty = true;
                }
                cur.is_last
            }
            None => false,
        }
    }

    fn render_cycle(&mut self) {
        let Some(cur) = self.current.as_ref() else {
            return;
        };
        self.orientation.apply_pending();
        self.angles = self.orientation.euler_angles();
        self.projection = Some(project(&cur.frame, &self.orientation, &self.config));
        self.dirty = true;
    }

    /// Re-project the current frame now instead of waiting for the next one.
    fn redraw(&mut self) {
        self.render_cycle();
        if self.current.is_none() {
            self.dirty = true;
        }
    }

    fn redraws_immediately(&mut self) -> bool {
        self.paused || self.config.manual_advance || self.refresh_last()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Rotate { axis, degrees } => {
                self.orientation.set_button_delta(axis, degrees);
                if self.redraws_immediately() {
                    self.redraw();
                }
            }
            Command::Drag { dx, dy } => {
                let (dim, djm) = drag_delta(dx, dy, self.area.0, self.area.1);
                self.orientation.set_drag_delta(dim, djm);
                if self.redraws_immediately() {
                    self.redraw();
                }
            }
            Command::Cursor { x, y } => {
                self.cursor = Some((x, y));
                self.dirty = true;
            }
            Command::CursorLeft => {
                self.cursor = None;
                self.dirty = true;
            }
            Command::ResetOrientation => {
                self.orientation.reset();
                if self.redraws_immediately() {
                    self.redraw();
                }
            }
            Command::TogglePause => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "pausing" } else { "unpausing" });
                self.dirty = true;
            }
            Command::Advance => self.advance = true,
            Command::Restart => self.restart(),
            Command::Quit => self.quit = true,
            Command::CyclePalette => {
                let palette = self.config.palette.next();
                self.update_config(|c| c.palette = palette);
            }
            Command::CycleDrawMode => {
                let mode = self.config.mode.next();
                self.update_config(|c| c.mode = mode);
            }
            Command::CycleSizeVariation => {
                let vary = self.config.vary.next();
                self.update_config(|c| c.vary = vary);
            }
            Command::ToggleSort => {
                let sort = self.config.sort.toggled();
                self.update_config(|c| c.sort = sort);
            }
            Command::ToggleTypes => self.update_config(|c| c.use_types = !c.use_types),
            Command::ToggleErase => self.update_config(|c| c.erase = !c.erase),
            Command::ToggleBackground => {
                self.update_config(|c| c.white_background = !c.white_background)
            }
            Command::Radius(delta) => {
                let radius = self.config.radius.saturating_add_signed(delta);
                let next = self.config.clone().with_radius(radius);
                self.apply_config(next);
            }
            Command::Faster => {
                let interval = self.config.interval.saturating_sub(INTERVAL_STEP);
                self.update_config(|c| c.interval = interval);
            }
            Command::Slower => {
                let interval = self.config.interval + INTERVAL_STEP;
                self.update_config(|c| c.interval = interval);
            }
        }
    }

    fn update_config(&mut self, edit: impl FnOnce(&mut Configuration)) {
        let mut next = self.config.clone();
        edit(&mut next);
        self.apply_config(next);
    }

    /// Replace the configuration. Parser-relevant changes restart the input.
    pub fn apply_config(&mut self, config: Configuration) {
        if config == self.config {
            return;
        }
        if let Err(e) = config.validate() {
            log::warn!("ignoring configuration change: {e}");
            return;
        }
        let restart = self.config.needs_restart(&config);
        if config.palette != self.config.palette {
            self.colormap = Colormap::new(config.palette);
        }
        if let Some(area) = config.area {
            self.area = area;
        }
        self.config = config;
        self.clear = true;
        if restart {
            self.restart();
        } else {
            self.redraw();
        }
    }

    /// Drop everything queued and read the input again from the start.
    pub fn restart(&mut self) {
        if self.config.input == InputSpec::Stdin {
            log::warn!("stdin cannot be rewound, continuing from the current position");
        }
        self.store.reset();
        self.swap.request(SourceRequest {
            input: self.config.input.clone(),
            options: ParseOptions::from_config(&self.config),
            epoch: self.store.epoch(),
        });
        log::info!("restarting {}", self.config.input.label());
        self.current = None;
        self.projection = None;
        self.clear = true;
        self.dirty = true;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Set the view area size in cells (terminal resize).
    pub fn set_area(&mut self, width: u16, height: u16) {
        if self.area != (width, height) {
            self.area = (width, height);
            self.clear = true;
            self.dirty = true;
        }
    }

    pub fn area(&self) -> (u16, u16) {
        self.area
    }

    /// Data coordinates of a view-area cell for the displayed frame.
    pub fn cursor_coordinates(&self, cx: u16, cy: u16) -> Option<(f64, f64)> {
        let projection = self.projection.as_ref()?;
        Some(screen::data_coordinates(cx, cy, &projection.bounds, self.area.0, self.area.1))
    }

    pub fn status(&self) -> Status {
        let frame = self.current.as_ref();
        Status {
            time: frame.map(|c| c.frame.time),
            sequence: frame.map(|c| c.seq),
            atoms: frame.map_or(0, |c| c.frame.atoms.len()),
            angles: self.angles,
            bounds: self.projection.as_ref().map(|p| p.bounds),
            cursor: self
                .cursor
                .and_then(|(x, y)| self.cursor_coordinates(x, y)),
            paused: self.paused,
            manual: self.config.manual_advance,
            at_end: frame.is_some_and(|c| c.is_last),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn orientation(&self) -> &OrientationState {
        &self.orientation
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn current(&self) -> Option<&CurrentFrame> {
        self.current.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Whether the display needs repainting; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Wipe and repaint everything on the next pass (the screen was lost).
    pub fn request_clear(&mut self) {
        self.clear = true;
        self.dirty = true;
    }

    /// Whether the view area must be wiped before painting; clears the flag.
    pub fn take_clear(&mut self) -> bool {
        std::mem::take(&mut self.clear)
    }

    /// Whether a new frame came in since the last call; clears the flag.
    pub fn take_fresh_frame(&mut self) -> bool {
        std::mem::take(&mut self.fresh_frame)
    }
}

// =============================================================================
// Tests
// =============================================================================
