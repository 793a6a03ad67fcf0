use crate::{Error, Result};

/// The array of values to be summed during one driver iteration.
///
/// Every element is `1.0`, so the analytically correct sum is always exactly
/// the element count - sums of ones are exact in binary floating point up to
/// magnitudes far beyond anything this benchmark allocates. That makes
/// exact-equality correctness checks valid regardless of the order in which
/// workers combine their contributions.
///
/// Allocation is fallible by design: the driver grows workloads
/// geometrically, so running out of memory is an expected end state that
/// must surface as an error rather than an abort.
///
/// # Examples
///
/// ```
/// use lock_cost::Workload;
///
/// let workload = Workload::all_ones(100)?;
///
/// assert_eq!(workload.len(), 100);
/// assert_eq!(workload.expected_total(), 100.0);
/// # Ok::<(), lock_cost::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Workload {
    values: Vec<f64>,
}

impl Workload {
    /// Allocates a workload of exactly `len` elements, each `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkloadAllocation`] if the allocator cannot provide
    /// the requested amount of memory.
    pub fn all_ones(len: usize) -> Result<Self> {
        let mut values = Vec::new();

        values
            .try_reserve_exact(len)
            .map_err(|source| Error::WorkloadAllocation { len, source })?;

        values.resize(len, 1.0);

        Ok(Self { values })
    }

    /// Returns the number of elements in the workload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the workload holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the values to be summed. Read-only to all workers while a
    /// strategy is running.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The analytically correct sum of this workload.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "all-ones workloads never approach the 2^53 exactness limit"
    )]
    pub fn expected_total(&self) -> f64 {
        self.values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::float_cmp,
        reason = "all-ones sums are exact in binary floating point"
    )]

    use super::*;

    #[test]
    fn all_ones_has_requested_length() {
        let workload = Workload::all_ones(37).unwrap();

        assert_eq!(workload.len(), 37);
        assert!(!workload.is_empty());
        assert!(workload.values().iter().all(|&value| value == 1.0));
    }

    #[test]
    fn empty_workload_is_valid() {
        let workload = Workload::all_ones(0).unwrap();

        assert!(workload.is_empty());
        assert_eq!(workload.expected_total(), 0.0);
    }

    #[test]
    fn expected_total_matches_length() {
        let workload = Workload::all_ones(1_000).unwrap();

        assert_eq!(workload.expected_total(), 1_000.0);
    }
}
