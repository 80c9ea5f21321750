//! Cancellable debounce: fire-at-most-once-per-window scheduling.
//!
//! Time is injected as `Instant` values so cancellation and coalescing
//! are testable without a wall clock. The debounce carries no payload —
//! whoever fires it reads live state at fire time, never state captured
//! at schedule time.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// (Re)start the window. A pending deadline is implicitly cancelled
    /// and replaced.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True if the window has elapsed; clears the deadline so the task
    /// fires at most once per scheduled window.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn fires_once_after_window() {
        let t0 = Instant::now();
        let mut d = Debounce::new(WINDOW);

        d.schedule(t0);
        assert!(!d.fire_due(t0 + Duration::from_millis(499)));
        assert!(d.fire_due(t0 + WINDOW));
        // Already fired: nothing pending
        assert!(!d.fire_due(t0 + WINDOW * 2));
    }

    #[test]
    fn reschedule_pushes_deadline_back() {
        let t0 = Instant::now();
        let mut d = Debounce::new(WINDOW);

        d.schedule(t0);
        // A new schedule inside the window replaces the deadline
        d.schedule(t0 + Duration::from_millis(400));
        assert!(!d.fire_due(t0 + WINDOW));
        assert!(d.fire_due(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn cancel_drops_pending_deadline() {
        let t0 = Instant::now();
        let mut d = Debounce::new(WINDOW);

        d.schedule(t0);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.fire_due(t0 + WINDOW * 4));
    }
}
