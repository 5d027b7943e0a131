#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Monotonic clock reporting the time between consecutive polls.
pub struct ElapsedClock {
    last_poll: Instant,
    /// Time covered by all polls so far
    pub total: Duration,
    /// Number of polls
    pub polls: u64,
}

impl Default for ElapsedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ElapsedClock {
    /// Creates a clock whose first poll measures from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_poll: Instant::now(),
            total: Duration::ZERO,
            polls: 0,
        }
    }

    /// Seconds elapsed since the previous poll (or since creation).
    pub fn poll(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now - self.last_poll;
        self.last_poll = now;
        self.total += delta;
        self.polls += 1;
        delta.as_secs_f64()
    }

    /// Forgets the time accumulated since the last poll.
    pub fn reset(&mut self) {
        self.last_poll = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_is_non_negative_and_counted() {
        let mut clock = ElapsedClock::new();
        let a = clock.poll();
        let b = clock.poll();
        assert!(a >= 0.0 && b >= 0.0);
        assert_eq!(clock.polls, 2);
    }
}
