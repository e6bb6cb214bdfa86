//! Fetch timing.

use std::time::{Duration, Instant};

/// Timing context started when a fetch is invoked.
#[derive(Debug, Clone, Copy)]
pub struct TimingContext {
    start: Instant,
}

impl TimingContext {
    /// Start a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time since start, rounded to whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        round_ms(self.elapsed())
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Round a duration to the nearest whole millisecond.
pub fn round_ms(duration: Duration) -> u64 {
    let micros = duration.as_micros();
    ((micros + 500) / 1000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_ms() {
        assert_eq!(round_ms(Duration::from_micros(0)), 0);
        assert_eq!(round_ms(Duration::from_micros(1_499)), 1);
        assert_eq!(round_ms(Duration::from_micros(1_500)), 2);
        assert_eq!(round_ms(Duration::from_millis(250)), 250);
    }

    #[test]
    fn test_elapsed_counts_from_creation() {
        let timing = TimingContext::new();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timing.elapsed_ms() >= 5);
        assert!(timing.elapsed() >= Duration::from_millis(5));
    }
}
