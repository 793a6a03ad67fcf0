use std::cell::UnsafeCell;

/// A shared `f64` accumulator with deliberately unsynchronized access.
///
/// This exists solely for the naive summation strategy, which demonstrates
/// what happens when concurrent read-modify-write goes unprotected: updates
/// are lost and the total comes out wrong. Replacing this with an atomic
/// would serialize the additions and erase the very effect the strategy is
/// there to show.
///
/// Nothing outside the naive strategy may touch this type, and the value
/// must only be read back after all workers have been joined.
#[derive(Debug)]
pub(crate) struct RacyCell {
    value: UnsafeCell<f64>,
}

// SAFETY: not actually synchronized. `Sync` is asserted so the naive strategy
// can share the cell across workers; the resulting races are intentional and
// the value they produce is unspecified.
unsafe impl Sync for RacyCell {}

impl RacyCell {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    /// Adds `delta` to the stored value with no synchronization whatsoever.
    ///
    /// # Safety
    ///
    /// Concurrent calls race against each other. The caller accepts that the
    /// stored value becomes unspecified once more than one thread is adding.
    pub(crate) unsafe fn add(&self, delta: f64) {
        // SAFETY: dereferencing the cell's own pointer; the race on the
        // pointee is the caller's declared intent.
        unsafe {
            *self.value.get() += delta;
        }
    }

    /// Consumes the cell and returns whatever value the races left behind.
    ///
    /// Taking `self` by value proves no worker can still be writing.
    pub(crate) fn into_inner(self) -> f64 {
        self.value.into_inner()
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::float_cmp,
        reason = "single-threaded additions are deterministic"
    )]

    use super::*;

    #[test]
    fn single_threaded_accumulation_is_exact() {
        let cell = RacyCell::new(0.0);

        for _ in 0..100 {
            // SAFETY: only one thread is adding, so no race occurs.
            unsafe {
                cell.add(1.0);
            }
        }

        assert_eq!(cell.into_inner(), 100.0);
    }
}
