//! Frame-indexed ring storage
//!
//! [`FrameSlotRing`] is the foundation for both resource tagging and the
//! cross-thread camera channels: a fixed-capacity container addressed by
//! `frame % capacity`, where a slot only answers for the exact frame index it
//! was last written with. Values from a wrapped-around slot are never
//! returned for an older frame.

use std::sync::atomic::{AtomicU64, Ordering};

use prism_sdk::FrameToken;

/// What a [`FrameSlotRing::write`] observed about the incoming frame index.
///
/// Duplicates and out-of-order writes are reported, not rejected; the most
/// recent write for a frame index wins and consumers only ever retrieve by
/// exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Frame index advanced as expected
    Stored,
    /// The slot already held this exact frame index
    Duplicate,
    /// Frame index is not the previously written index + 1
    OutOfOrder,
}

struct FrameSlot<V> {
    /// Unset until the slot is first written
    frame: Option<u64>,
    value: V,
}

/// Fixed-capacity associative ring buffer keyed by frame index.
///
/// Capacity is fixed at construction; there is no eviction API, overwrite is
/// purely addressing-driven. The container itself is not synchronized -
/// callers wrap it in whatever lock their access pattern needs.
pub struct FrameSlotRing<V> {
    slots: Box<[FrameSlot<V>]>,
    last_written: Option<u64>,
}

impl<V: Default> FrameSlotRing<V> {
    /// Create a ring with `capacity` pre-sized slots. Slots are never
    /// reallocated afterwards.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        let slots = (0..capacity)
            .map(|_| FrameSlot {
                frame: None,
                value: V::default(),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            last_written: None,
        }
    }
}

impl<V> FrameSlotRing<V> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn index(&self, frame: u64) -> usize {
        (frame % self.slots.len() as u64) as usize
    }

    /// Store `value` for `frame`, superseding whatever the aliasing slot held.
    pub fn write(&mut self, frame: u64, value: V) -> WriteOutcome {
        let idx = self.index(frame);
        let outcome = if self.slots[idx].frame == Some(frame) {
            WriteOutcome::Duplicate
        } else if matches!(self.last_written, Some(last) if last + 1 != frame) {
            WriteOutcome::OutOfOrder
        } else {
            WriteOutcome::Stored
        };

        self.slots[idx].frame = Some(frame);
        self.slots[idx].value = value;
        self.last_written = Some(frame);
        outcome
    }

    /// Value stored for exactly `frame`, or `None` if the aliasing slot holds
    /// a different frame (not yet produced, or already superseded).
    pub fn read(&self, frame: u64) -> Option<&V> {
        let slot = &self.slots[self.index(frame)];
        (slot.frame == Some(frame)).then_some(&slot.value)
    }

    /// Frame index currently stamped on the slot that `frame` maps to
    pub fn frame_at(&self, frame: u64) -> Option<u64> {
        self.slots[self.index(frame)].frame
    }

    /// Physical slot access by ring position, ignoring the frame stamp.
    ///
    /// For containers that keep their own frame matching under interior
    /// locks (the resource tag store) and only borrow the addressing scheme.
    pub fn slot(&self, frame: u64) -> &V {
        &self.slots[self.index(frame)].value
    }

    /// Most recently written frame index, if any
    pub fn last_written(&self) -> Option<u64> {
        self.last_written
    }
}

const NO_FRAME: u64 = u64::MAX;

/// Atomic record of the most recently presented application frame.
///
/// Fed by the present hook site; read by the tag recycler to decide which
/// frame slots have fallen out of the retained history window.
pub struct FrameClock {
    present: AtomicU64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            present: AtomicU64::new(NO_FRAME),
        }
    }

    /// Record `frame` as the most recently presented one.
    ///
    /// `u64::MAX` is reserved as the internal "never presented" marker and
    /// is not a valid frame index here.
    pub fn mark_present(&self, frame: FrameToken) {
        debug_assert!(
            frame.index() != NO_FRAME,
            "frame index u64::MAX is reserved"
        );
        self.present.store(frame.index(), Ordering::Release);
    }

    /// Last presented frame, `None` before the first present
    pub fn present_frame(&self) -> Option<FrameToken> {
        match self.present.load(Ordering::Acquire) {
            NO_FRAME => None,
            f => Some(FrameToken(f)),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
