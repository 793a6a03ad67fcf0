use std::time::{Duration, Instant};

/// A reusable stopwatch backed by the monotonic [`Instant`] clock.
///
/// The monotonic clock is unaffected by wall-clock adjustments such as NTP
/// corrections, so elapsed readings are never negative and never distorted
/// by calendar time moving around underneath the benchmark.
///
/// # Examples
///
/// ```
/// use lock_cost::Stopwatch;
///
/// let mut watch = Stopwatch::start_new();
/// let first = watch.elapsed();
///
/// watch.restart();
/// let second = watch.elapsed();
///
/// assert!(first.as_secs_f64() >= 0.0);
/// assert!(second.as_secs_f64() >= 0.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Creates a stopwatch that starts measuring immediately.
    #[must_use]
    pub fn start_new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Re-arms the stopwatch so that [`elapsed()`][Self::elapsed] measures
    /// from this moment instead of from the previous start.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    /// Returns the time elapsed since the last start.
    ///
    /// Render with [`Duration::as_secs_f64()`] for a floating-point number
    /// of seconds with sub-millisecond resolution.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Real timing logic in tests is not desirable.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start_new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_immediately_after_start_is_near_zero() {
        let watch = Stopwatch::start_new();

        let elapsed = watch.elapsed();

        // Generous upper bound to keep this robust on busy test hosts.
        assert!(elapsed < Duration::from_millis(100));
    }

    #[test]
    fn restart_rearms_the_measurement() {
        let mut watch = Stopwatch::start_new();

        std::thread::sleep(Duration::from_millis(10));
        watch.restart();

        assert!(watch.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn elapsed_is_monotonic() {
        let watch = Stopwatch::start_new();

        let first = watch.elapsed();
        let second = watch.elapsed();

        assert!(second >= first);
    }
}
