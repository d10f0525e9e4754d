//! Single-shot quiescence deadline

use crossbeam_channel::{after, never, Receiver};
use std::time::{Duration, Instant};

/// Deadline for delivering the pending set if nothing else touches it
///
/// Armed means a fresh `after(delay)` channel is in place; disarmed means the
/// deadline channel never fires. Rearming always starts a full-length window.
pub struct QuiescenceTimer {
    delay: Duration,
    deadline: Receiver<Instant>,
    armed_at: Option<Instant>,
}

impl QuiescenceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: never(),
            armed_at: None,
        }
    }

    /// Start a full window from now, discarding any earlier deadline
    pub fn arm(&mut self) {
        self.deadline = after(self.delay);
        self.armed_at = Some(Instant::now());
    }

    pub fn disarm(&mut self) {
        self.deadline = never();
        self.armed_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Time left until expiry, `None` when disarmed
    pub fn remaining(&self) -> Option<Duration> {
        self.armed_at
            .map(|at| self.delay.saturating_sub(at.elapsed()))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Channel that yields once when the current window elapses
    pub fn deadline(&self) -> &Receiver<Instant> {
        &self.deadline
    }
}
