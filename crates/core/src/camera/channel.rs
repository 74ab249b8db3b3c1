//! Producer/consumer handoff of per-frame values with bounded wait

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use prism_sdk::FrameToken;

use crate::frame::{FrameSlotRing, WriteOutcome};

/// Typed per-frame channel between a producer thread and a consumer running
/// a few frames behind.
///
/// A single mutex guards the ring; a condition variable wakes consumers
/// blocked on a frame that has not been produced yet. Waits are always
/// bounded - a stalled or vanished producer can delay a consumer by at most
/// the configured timeout.
pub struct FrameDataChannel<T> {
    ring: Mutex<FrameSlotRing<T>>,
    produced: Condvar,
    /// Frames below this index never block (engines often skip emitting the
    /// first few frames; blocking would stall startup)
    startup_no_wait_frames: u64,
    wait_timeout: Duration,
    label: &'static str,
}

impl<T: Clone + Default> FrameDataChannel<T> {
    pub fn new(
        label: &'static str,
        capacity: usize,
        startup_no_wait_frames: u64,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            ring: Mutex::new(FrameSlotRing::new(capacity)),
            produced: Condvar::new(),
            startup_no_wait_frames,
            wait_timeout,
            label,
        }
    }

    /// Store `value` for `frame` and wake any consumer waiting on it.
    ///
    /// Frame 0 is reserved and never stored. A duplicate insert for a frame
    /// the ring already holds is a logged no-op; non-consecutive frames are
    /// logged but still applied.
    pub fn insert(&self, frame: FrameToken, value: T) {
        let f = frame.index();
        if f == 0 {
            return;
        }

        let mut ring = self.ring.lock();
        if ring.frame_at(f) == Some(f) {
            tracing::warn!("{} data for frame {f} already set", self.label);
            return;
        }
        let last = ring.last_written();
        if ring.write(f, value) == WriteOutcome::OutOfOrder {
            tracing::warn!(
                "out of order {} data detected, last: {:?}, pushing: {f}",
                self.label,
                last
            );
        }
        self.produced.notify_all();
    }

    /// Retrieve the value stored for exactly `frame`.
    ///
    /// Returns immediately on a match; otherwise blocks until the frame is
    /// produced or the timeout elapses. A timeout returns `None` with a
    /// warning - callers fall back, they never treat this as fatal.
    pub fn get(&self, frame: FrameToken) -> Option<T> {
        let f = frame.index();
        let mut ring = self.ring.lock();
        if let Some(value) = ring.read(f) {
            return Some(value.clone());
        }

        tracing::warn!(
            "{} data for frame {f} was not readily available, this should not happen often",
            self.label
        );

        let timeout = if f < self.startup_no_wait_frames {
            Duration::ZERO
        } else {
            self.wait_timeout
        };
        if timeout.is_zero() {
            return None;
        }

        let deadline = Instant::now() + timeout;
        loop {
            if self.produced.wait_until(&mut ring, deadline).timed_out() {
                // One last check under the lock before giving up.
                if let Some(value) = ring.read(f) {
                    return Some(value.clone());
                }
                tracing::warn!(
                    "timed out waiting {}ms for {} data, frame {f}",
                    timeout.as_millis(),
                    self.label
                );
                return None;
            }
            if let Some(value) = ring.read(f) {
                return Some(value.clone());
            }
        }
    }

    /// Most recently inserted frame, if any
    pub fn last_written(&self) -> Option<FrameToken> {
        self.ring.lock().last_written().map(FrameToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn channel(capacity: usize) -> FrameDataChannel<u32> {
        FrameDataChannel::new("test", capacity, 5, Duration::from_millis(100))
    }

    #[test]
    fn immediate_hit_returns_without_waiting() {
        let ch = channel(4);
        ch.insert(FrameToken(1), 11);
        assert_eq!(ch.get(FrameToken(1)), Some(11));
    }

    #[test]
    fn frame_zero_never_stored() {
        let ch = channel(4);
        ch.insert(FrameToken(0), 99);
        assert_eq!(ch.get(FrameToken(0)), None);
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let ch = channel(4);
        ch.insert(FrameToken(2), 20);
        ch.insert(FrameToken(2), 21);
        assert_eq!(ch.get(FrameToken(2)), Some(20));
    }

    #[test]
    fn early_frames_do_not_block() {
        let ch = channel(4);
        let start = Instant::now();
        assert_eq!(ch.get(FrameToken(3)), None);
        assert!(
            start.elapsed() < Duration::from_millis(50),
            "startup frames must not wait for the full timeout"
        );
    }

    #[test]
    fn late_frame_blocks_then_times_out() {
        let ch = channel(4);
        let start = Instant::now();
        assert_eq!(ch.get(FrameToken(9)), None);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(90), "waited only {waited:?}");
        assert!(waited < Duration::from_secs(2));
    }

    #[test]
    fn blocked_get_wakes_on_insert() {
        let ch = Arc::new(FrameDataChannel::<u32>::new(
            "test",
            4,
            5,
            Duration::from_secs(5),
        ));
        let consumer = {
            let ch = Arc::clone(&ch);
            thread::spawn(move || ch.get(FrameToken(8)))
        };

        thread::sleep(Duration::from_millis(30));
        ch.insert(FrameToken(8), 80);

        assert_eq!(consumer.join().unwrap(), Some(80));
    }

    #[test]
    fn wraparound_supersedes_old_frame() {
        let ch = channel(4);
        for f in 1..=4 {
            ch.insert(FrameToken(f), f as u32);
        }
        assert_eq!(ch.get(FrameToken(1)), Some(1));

        // Frame 5 aliases slot 1 mod 4; frame 1 is superseded.
        ch.insert(FrameToken(5), 5);
        assert_eq!(ch.get(FrameToken(5)), Some(5));
        assert_eq!(ch.get(FrameToken(1)), None);
    }
}
