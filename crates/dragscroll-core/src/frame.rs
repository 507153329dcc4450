//! L4 Atomic Layer: Frame scheduling
//!
//! A frame request asks the host to call back once before the next repaint.
//! Hosts with a native repaint signal implement [`FrameScheduler`] directly;
//! everything else can embed [`IntervalFrames`], which emulates frames with a
//! fixed 120 Hz timer.

use std::time::{Duration, Instant};

use crate::timing::Clock;

/// Fallback frame cadence (1000 / 120 ms)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(8_333);

/// Opaque id of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Schedules one callback per repaint
pub trait FrameScheduler {
    /// Request a callback before the next repaint
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request; unknown or already-fired handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Timer-driven frame emulation
///
/// Each request becomes due one interval after it was made. The owner polls
/// [`IntervalFrames::take_due`] and delivers the returned handles.
#[derive(Debug, Clone)]
pub struct IntervalFrames<C> {
    clock: C,
    interval: Duration,
    next_id: u64,
    pending: Vec<(FrameHandle, Instant)>,
}

impl<C: Clock> IntervalFrames<C> {
    pub fn new(clock: C) -> Self {
        Self::with_interval(clock, DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_interval(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of outstanding requests
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
    }

    /// Earliest due time among outstanding requests
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, due)| *due).min()
    }

    /// Remove and return every request that is due, oldest first
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        let now = self.clock.now();
        let mut due: Vec<(FrameHandle, Instant)> = Vec::new();
        self.pending.retain(|&(handle, at)| {
            if at <= now {
                due.push((handle, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(handle, at)| (at, handle.raw()));
        due.into_iter().map(|(handle, _)| handle).collect()
    }
}

impl<C: Clock> FrameScheduler for IntervalFrames<C> {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending.push((handle, self.clock.now() + self.interval));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ManualClock;

    #[test]
    fn test_request_becomes_due_after_interval() {
        let clock = ManualClock::new();
        let mut frames = IntervalFrames::new(clock.clone());

        let handle = frames.request_frame();
        assert!(frames.take_due().is_empty());

        clock.advance(Duration::from_millis(4));
        assert!(frames.take_due().is_empty());

        clock.advance(Duration::from_millis(5));
        assert_eq!(frames.take_due(), vec![handle]);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_cancelled_request_never_fires() {
        let clock = ManualClock::new();
        let mut frames = IntervalFrames::new(clock.clone());

        let handle = frames.request_frame();
        frames.cancel_frame(handle);
        assert!(!frames.is_pending(handle));

        clock.advance(Duration::from_millis(20));
        assert!(frames.take_due().is_empty());
    }

    #[test]
    fn test_handles_are_unique_and_ordered() {
        let clock = ManualClock::new();
        let mut frames = IntervalFrames::with_interval(clock.clone(), Duration::from_millis(10));

        let first = frames.request_frame();
        clock.advance(Duration::from_millis(1));
        let second = frames.request_frame();
        assert_ne!(first, second);
        assert_eq!(frames.next_due(), Some(clock.now() + Duration::from_millis(9)));

        clock.advance(Duration::from_millis(10));
        assert_eq!(frames.take_due(), vec![first, second]);
    }
}
