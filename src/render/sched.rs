use std::time::{Duration, Instant};

/// Nominal frame window: one paint frame at ~60 fps.
pub const FRAME_WINDOW: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug)]
/// Coalesces bursts of state-change events into one repaint per frame window.
///
/// Trailing-edge debounce with a single invariant: at most one pending
/// deadline. The first [`RenderScheduler::schedule`] after an idle period
/// arms the deadline; further calls inside the window change nothing, so the
/// state painted is whatever is current when the deadline elapses.
/// Intermediate states are never individually rendered.
///
/// Time is passed in explicitly, which makes the debounce drivable by a
/// synthetic clock in tests. No cancellation primitive exists; the next
/// schedule after a fire simply arms a fresh deadline.
pub struct RenderScheduler {
    frame_window: Duration,
    deadline: Option<Instant>,
}

impl RenderScheduler {
    /// Construct a scheduler with the nominal frame window.
    pub fn new() -> Self {
        Self::with_window(FRAME_WINDOW)
    }

    /// Construct a scheduler with an explicit frame window.
    pub fn with_window(frame_window: Duration) -> Self {
        Self {
            frame_window,
            deadline: None,
        }
    }

    /// Request a repaint. Arms the deadline when idle; a no-op while one is
    /// already pending.
    pub fn schedule(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.frame_window);
        }
    }

    /// Whether a repaint is due but not yet fired.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire and disarm if the deadline has elapsed. Returns whether the
    /// caller should paint now.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm without painting (session reset).
    pub fn reset(&mut self) {
        self.deadline = None;
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sched.rs"]
mod tests;
