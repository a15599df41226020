//! Leading-edge throttle for UI-triggered calls
//!
//! Lets the first call through and rejects the rest until the interval has
//! elapsed. Nothing is queued or replayed.

use std::time::{Duration, Instant};

use chatwire_domain::constants::DEFAULT_THROTTLE_MS;
use parking_lot::Mutex;

#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: Mutex::new(None) }
    }

    /// Returns `true` when the caller may proceed.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        let mut last = self.last.lock();
        match *last {
            Some(previous) if now.saturating_duration_since(previous) <= self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_THROTTLE_MS))
    }
}
