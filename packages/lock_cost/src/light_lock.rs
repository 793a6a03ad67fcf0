use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The in-process lock guarding a shared `f64` accumulator.
///
/// This is a plain [`std::sync::Mutex`] with an acquisition counter bolted
/// on, playing the lightweight half of the benchmark's lock comparison: no
/// system-wide name, no kernel round-trip in the uncontended case. The
/// counter makes lock traffic observable, which is how the subtotal
/// strategy's "exactly one acquisition per worker" promise is verified.
///
/// One instance lives in each [`Session`][crate::Session] for the whole
/// session lifetime; only the accumulator and counter are reset between
/// trials.
///
/// # Examples
///
/// ```
/// use lock_cost::LightLock;
///
/// let lock = LightLock::new();
///
/// *lock.lock() += 2.5;
/// *lock.lock() += 2.5;
///
/// assert_eq!(lock.acquisitions(), 2);
/// ```
#[derive(Debug, Default)]
pub struct LightLock {
    total: Mutex<f64>,
    acquisitions: AtomicU64,
}

impl LightLock {
    /// Creates a lock around a zeroed accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock, blocking until it is available, and counts the
    /// acquisition.
    pub fn lock(&self) -> MutexGuard<'_, f64> {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);

        self.total
            .lock()
            .expect("accumulator mutex cannot be poisoned: the guarded section never panics")
    }

    /// Number of times the lock has been acquired since the last reset.
    #[must_use]
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }

    /// Zeroes the accumulator and the acquisition counter for the next
    /// trial. Deliberately bypasses the counter: resetting is setup, not
    /// strategy work.
    pub(crate) fn reset(&mut self) {
        *self
            .total
            .get_mut()
            .expect("accumulator mutex cannot be poisoned: the guarded section never panics") = 0.0;

        *self.acquisitions.get_mut() = 0;
    }

    /// Reads the accumulator without locking. Requires exclusive access,
    /// which proves no worker can be mid-update.
    pub(crate) fn total(&mut self) -> f64 {
        *self
            .total
            .get_mut()
            .expect("accumulator mutex cannot be poisoned: the guarded section never panics")
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::float_cmp,
        reason = "all-ones sums are exact in binary floating point"
    )]

    use std::thread;

    use super::*;

    #[test]
    fn counts_acquisitions() {
        let lock = LightLock::new();

        for _ in 0..5 {
            *lock.lock() += 1.0;
        }

        assert_eq!(lock.acquisitions(), 5);
    }

    #[test]
    fn reset_zeroes_accumulator_and_counter() {
        let mut lock = LightLock::new();

        *lock.lock() += 3.0;
        lock.reset();

        assert_eq!(lock.total(), 0.0);
        assert_eq!(lock.acquisitions(), 0);
    }

    #[test]
    fn serializes_concurrent_additions() {
        let lock = LightLock::new();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1_000 {
                        *lock.lock() += 1.0;
                    }
                });
            }
        });

        let mut lock = lock;
        assert_eq!(lock.total(), 4_000.0);
        assert_eq!(lock.acquisitions(), 4_000);
    }
}
