//! Timing
//!
//! Monotonic wall-clock timer around one invocation of the measured callable.

use std::time::{Duration, Instant};

/// Timer for a single measured call
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since `start`
    #[inline(always)]
    pub fn stop(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in seconds, the unit samples are stored in
    #[inline(always)]
    pub fn stop_secs(&self) -> f64 {
        self.stop().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.stop();

        // Should be at least 10ms
        assert!(elapsed >= Duration::from_millis(10));
        // Should be less than 1s (accounting for scheduling)
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn test_stop_secs() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(5));
        let secs = timer.stop_secs();

        assert!(secs >= 0.005);
        assert!(secs < 1.0);
    }
}
