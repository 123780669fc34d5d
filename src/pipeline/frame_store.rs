//! Ring buffer of frame slots shared by the reader thread and the session.
//!
//! ```text
//!   reader thread                                   session (UI loop)
//!   ─────────────                                   ─────────────────
//!   acquire_fill_slot ── blocks ──┐          ┌── acquire_render_slot (never blocks)
//!         │                      │          │         │
//!   FillSlot::fill               ▼          ▼         ▼
//!         │             Free → Filling → Ready → Rendering → Consumed → Free
//!   commit_fill_slot ─────────────┘          └── release_render_slot
//! ```
//!
//! Both cursors are monotonic sequence numbers; the slot for sequence `s` is
//! `s % capacity`. The producer may run at most `capacity - 1` frames ahead
//! of the consumer, which is the only back-pressure in the pipeline.
//!
//! `reset` bumps an epoch. A fill slot acquired before a reset can no longer
//! be committed, so a reader that is mid-frame when the session restarts
//! cannot leak a stale frame into the fresh ring.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::types::Frame;

/// Lifecycle of one ring slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,
    Filling,
    Ready,
    Rendering,
    Consumed,
}

#[derive(Debug)]
struct Slot {
    state: SlotState,
    frame: Option<Arc<Frame>>,
}

#[derive(Debug)]
struct Ring {
    slots: Vec<Slot>,
    write: u64,
    read: u64,
    epoch: u64,
    /// Sequence of the final frame of the input, once known.
    last: Option<u64>,
    closed: bool,
}

impl Ring {
    fn index(&self, seq: u64) -> usize {
        (seq % self.slots.len() as u64) as usize
    }

    fn any_rendering(&self) -> bool {
        self.slots.iter().any(|s| s.state == SlotState::Rendering)
    }
}

/// Write access to one slot, owned by the producer between acquire and commit.
#[derive(Debug)]
pub struct FillSlot {
    index: usize,
    seq: u64,
    epoch: u64,
    frame: Option<Frame>,
}

impl FillSlot {
    /// Store the frame to publish. Replaces anything filled before.
    pub fn fill(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }

    pub fn sequence(&self) -> u64 {
        self.seq
    }

    /// Store epoch this slot was acquired in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// A frame checked out for rendering.
#[derive(Debug, Clone)]
pub struct RenderSlot {
    pub seq: u64,
    pub frame: Arc<Frame>,
    /// Either flagged by the parser or marked after the fact by the reader.
    pub is_last: bool,
}

#[derive(Debug)]
pub struct FrameStore {
    ring: Mutex<Ring>,
    changed: Condvar,
}

impl FrameStore {
    /// Create a store with `capacity` slots. Capacities below 2 are raised to 2.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let slots = (0..capacity)
            .map(|_| Slot {
                state: SlotState::Free,
                frame: None,
            })
            .collect();
        Self {
            ring: Mutex::new(Ring {
                slots,
                write: 0,
                read: 0,
                epoch: 0,
                last: None,
                closed: false,
            }),
            changed: Condvar::new(),
        }
    }

    // A panic while holding the lock leaves the ring consistent (every
    // transition is a single assignment), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Ring>) -> MutexGuard<'a, Ring> {
        self.changed.wait(guard).unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Producer side
    // =========================================================================

    /// Block until the next slot may be filled, then claim it.
    ///
    /// Returns `None` once the store is closed.
    pub fn acquire_fill_slot(&self) -> Option<FillSlot> {
        let mut ring = self.lock();
        loop {
            if ring.closed {
                return None;
            }
            let index = ring.index(ring.write);
            let ahead = ring.write - ring.read;
            if ring.slots[index].state == SlotState::Free && ahead < ring.slots.len() as u64 - 1 {
                ring.slots[index].state = SlotState::Filling;
                return Some(FillSlot {
                    index,
                    seq: ring.write,
                    epoch: ring.epoch,
                    frame: None,
                });
            }
            log::trace!("ring full at seq {}, waiting for consumer", ring.write);
            ring = self.wait(ring);
        }
    }

    /// Publish a filled slot.
    ///
    /// Returns `false` and drops the frame if the store was reset after the
    /// slot was acquired, or if the slot was never filled.
    pub fn commit_fill_slot(&self, mut slot: FillSlot) -> bool {
        let mut ring = self.lock();
        if slot.epoch != ring.epoch {
            log::debug!("dropping frame {} from epoch {}", slot.seq, slot.epoch);
            return false;
        }
        let Some(frame) = slot.frame.take() else {
            ring.slots[slot.index].state = SlotState::Free;
            self.changed.notify_all();
            return false;
        };
        if frame.is_last {
            ring.last = Some(slot.seq);
        }
        let cell = &mut ring.slots[slot.index];
        cell.frame = Some(Arc::new(frame));
        cell.state = SlotState::Ready;
        ring.write += 1;
        self.changed.notify_all();
        true
    }

    /// Give a claimed slot back without publishing anything.
    pub fn abandon_fill_slot(&self, slot: FillSlot) {
        let mut ring = self.lock();
        if slot.epoch == ring.epoch && ring.slots[slot.index].state == SlotState::Filling {
            ring.slots[slot.index].state = SlotState::Free;
            self.changed.notify_all();
        }
    }

    /// Record that the frame with sequence `seq` ends the input.
    pub fn mark_last(&self, seq: u64) {
        let mut ring = self.lock();
        ring.last = Some(seq);
        self.changed.notify_all();
    }

    /// `mark_last`, unless the store was reset after `epoch`.
    pub fn mark_last_in_epoch(&self, epoch: u64, seq: u64) -> bool {
        let mut ring = self.lock();
        if ring.epoch != epoch {
            return false;
        }
        ring.last = Some(seq);
        self.changed.notify_all();
        true
    }

    // =========================================================================
    // Consumer side
    // =========================================================================

    /// Check out the frame at the read cursor if it is ready. Never blocks.
    pub fn acquire_render_slot(&self) -> Option<RenderSlot> {
        let mut ring = self.lock();
        if ring.write == ring.read {
            return None;
        }
        let seq = ring.read;
        let index = ring.index(seq);
        let marked = ring.last == Some(seq);
        let cell = &mut ring.slots[index];
        if cell.state != SlotState::Ready {
            return None;
        }
        let frame = cell.frame.clone()?;
        cell.state = SlotState::Rendering;
        let is_last = marked || frame.is_last;
        Some(RenderSlot { seq, frame, is_last })
    }

    /// Finish rendering the slot at the read cursor and hand it back to the
    /// producer. Returns `false` if nothing was being rendered.
    pub fn release_render_slot(&self) -> bool {
        let mut ring = self.lock();
        let index = ring.index(ring.read);
        let cell = &mut ring.slots[index];
        if cell.state != SlotState::Rendering {
            return false;
        }
        cell.state = SlotState::Consumed;
        cell.frame = None;
        cell.state = SlotState::Free;
        ring.read += 1;
        self.changed.notify_all();
        true
    }

    /// Whether `seq` is known to be the final frame.
    pub fn is_last(&self, seq: u64) -> bool {
        let ring = self.lock();
        ring.last == Some(seq) || frame_is_last(&ring, seq)
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Drop every queued frame and rewind both cursors.
    ///
    /// Waits for an in-progress render to be released first. Any fill slot
    /// handed out before the reset becomes uncommittable.
    pub fn reset(&self) {
        let mut ring = self.lock();
        while ring.any_rendering() && !ring.closed {
            ring = self.wait(ring);
        }
        for slot in ring.slots.iter_mut() {
            slot.state = SlotState::Free;
            slot.frame = None;
        }
        ring.write = 0;
        ring.read = 0;
        ring.last = None;
        ring.epoch += 1;
        log::debug!("frame store reset, epoch {}", ring.epoch);
        self.changed.notify_all();
    }

    /// Wake every blocked producer call; later acquires return `None`.
    pub fn close(&self) {
        let mut ring = self.lock();
        ring.closed = true;
        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// `(write, read)` sequence cursors.
    pub fn cursors(&self) -> (u64, u64) {
        let ring = self.lock();
        (ring.write, ring.read)
    }

    /// State of slot `index`, `None` if out of range.
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.lock().slots.get(index).map(|s| s.state)
    }

    /// Every slot state, read under one lock.
    pub fn slot_states(&self) -> Vec<SlotState> {
        self.lock().slots.iter().map(|s| s.state).collect()
    }

    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Frames committed but not yet released.
    pub fn pending(&self) -> u64 {
        let ring = self.lock();
        ring.write - ring.read
    }
}

fn frame_is_last(ring: &Ring, seq: u64) -> bool {
    if seq >= ring.write {
        return false;
    }
    let cell = &ring.slots[ring.index(seq)];
    cell.frame.as_ref().is_some_and(|f| f.is_last)
}

// =============================================================================
// Tests
// =============================================================================
