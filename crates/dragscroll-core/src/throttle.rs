//! L4 Atomic Layer: Leading-edge rate limiter
//!
//! The first call after a quiet window goes through immediately; every
//! further call inside the window is dropped. Nothing is deferred, so there
//! is no trailing invocation once the window closes.

use std::time::{Duration, Instant};

/// Default sampling window for pointer events
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` if a call at `now` may run, and starts a new window
    /// when it does.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let open = match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        if open {
            self.last_fired = Some(now);
        }
        open
    }

    /// Forget the current window
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE)
    }
}
