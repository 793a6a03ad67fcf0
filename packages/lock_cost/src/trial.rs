use std::fmt;
use std::time::Duration;

/// Identifies one of the five summation strategies.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Strategy {
    /// Single-threaded left-to-right fold; the correctness and timing
    /// baseline.
    Sequential,

    /// Parallel accumulation with no synchronization - intentionally racy.
    Naive,

    /// Parallel accumulation with one named-mutex acquisition per element.
    NamedMutex,

    /// Parallel accumulation with one light-lock acquisition per element.
    LightLock,

    /// Per-worker private subtotal folded into the shared total under a
    /// single light-lock acquisition.
    Subtotal,
}

impl Strategy {
    /// The label used in report lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Naive => "Parallel",
            Self::NamedMutex => "ParallelWithNamedMutex",
            Self::LightLock => "ParallelWithLightLock",
            Self::Subtotal => "ParallelWithSubtotal",
        }
    }
}

/// The structured result of one timed measurement: which strategy ran, on
/// how many elements, what total it produced and how long it took.
///
/// The [`Display`][fmt::Display] rendering is the report line the driver
/// prints; the accessors exist so tests and callers can assert on results
/// without parsing console output.
#[derive(Clone, Copy, Debug)]
pub struct Trial {
    strategy: Strategy,
    len: usize,
    total: f64,
    elapsed: Duration,
}

impl Trial {
    pub(crate) fn new(strategy: Strategy, len: usize, total: f64, elapsed: Duration) -> Self {
        Self {
            strategy,
            len,
            total,
            elapsed,
        }
    }

    /// The strategy that produced this result.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Number of elements in the workload that was summed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the workload was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The computed total. Exactly `len` for every strategy except the
    /// naive one, whose result is unspecified under real parallelism.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Wall-clock time the measurement took.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time as a floating-point number of seconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

impl fmt::Display for Trial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total {:.6}, {:.7} seconds",
            self.strategy.label(),
            self.total,
            self.elapsed_seconds()
        )
    }
}
