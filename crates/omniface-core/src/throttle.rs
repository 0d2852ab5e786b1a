//! Rate limiter for frame-derived state updates.

use std::time::{Duration, Instant};

/// Default minimum interval between two applied frames (≈16 fps).
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60);

/// Admits at most one event per window. Events arriving inside the window
/// are dropped, not queued; the first event is always admitted.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns true (and starts a new window) if `now` is outside the current one.
    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(prev) if now.saturating_duration_since(prev) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
