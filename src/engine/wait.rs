//! Wait: A single freezable delay.
//!
//! Pausing freezes the remaining time instead of the deadline, so resuming
//! continues exactly where the wait left off rather than restarting it.

use std::time::{Duration, Instant};

/// The one in-flight delay of an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wait {
    /// When the wait elapses while running.
    deadline: Instant,
    /// Remaining time while frozen.
    frozen: Option<Duration>,
}

impl Wait {
    /// Arm a wait of `duration` starting at `from`.
    pub(crate) fn new(from: Instant, duration: Duration) -> Self {
        Self {
            deadline: from + duration,
            frozen: None,
        }
    }

    pub(crate) const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the wait has elapsed at `now`. A frozen wait never elapses.
    pub(crate) fn is_due(&self, now: Instant) -> bool {
        self.frozen.is_none() && now >= self.deadline
    }

    /// Stop the countdown, keeping the remaining time.
    pub(crate) fn freeze(&mut self, now: Instant) {
        if self.frozen.is_none() {
            self.frozen = Some(self.deadline.saturating_duration_since(now));
        }
    }

    /// Restart the countdown from the remaining time.
    pub(crate) fn thaw(&mut self, now: Instant) {
        if let Some(remaining) = self.frozen.take() {
            self.deadline = now + remaining;
        }
    }

    /// Time left at `now`.
    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        self.frozen
            .unwrap_or_else(|| self.deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_due() {
        let t0 = Instant::now();
        let wait = Wait::new(t0, Duration::from_millis(100));
        assert!(!wait.is_due(t0 + Duration::from_millis(99)));
        assert!(wait.is_due(t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_wait_freeze_preserves_remaining() {
        let t0 = Instant::now();
        let mut wait = Wait::new(t0, Duration::from_millis(100));
        wait.freeze(t0 + Duration::from_millis(30));
        assert!(!wait.is_due(t0 + Duration::from_secs(10)));
        assert_eq!(wait.remaining(t0 + Duration::from_secs(10)), Duration::from_millis(70));

        let resumed_at = t0 + Duration::from_secs(10);
        wait.thaw(resumed_at);
        assert_eq!(wait.deadline(), resumed_at + Duration::from_millis(70));
    }

    #[test]
    fn test_wait_double_freeze_is_noop() {
        let t0 = Instant::now();
        let mut wait = Wait::new(t0, Duration::from_millis(100));
        wait.freeze(t0 + Duration::from_millis(10));
        wait.freeze(t0 + Duration::from_millis(50));
        assert_eq!(wait.remaining(t0), Duration::from_millis(90));
    }
}
