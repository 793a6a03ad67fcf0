use std::num::NonZero;
use std::ops::Range;

/// The contiguous block of workload indices owned by one worker.
///
/// The workload is divided into `workers` blocks of `ceil(len / workers)`
/// elements each. Blocks are pairwise disjoint and together cover the whole
/// workload exactly; the trailing blocks may be shorter or empty when `len`
/// is not evenly divisible or when there are more workers than elements.
///
/// # Examples
///
/// ```
/// use lock_cost::Partition;
/// use new_zealand::nz;
///
/// // 10 elements across 4 workers: blocks of 3, 3, 3, 1.
/// assert_eq!(Partition::for_worker(0, nz!(4), 10).range(), 0..3);
/// assert_eq!(Partition::for_worker(3, nz!(4), 10).range(), 9..10);
///
/// // More workers than elements: the surplus workers get empty blocks.
/// assert!(Partition::for_worker(5, nz!(8), 3).is_empty());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Partition {
    start: usize,
    end: usize,
}

impl Partition {
    /// Computes the block of indices assigned to `worker` out of `workers`
    /// total, for a workload of `len` elements.
    #[must_use]
    pub fn for_worker(worker: usize, workers: NonZero<usize>, len: usize) -> Self {
        let block = len.div_ceil(workers.get());

        let start = worker.saturating_mul(block).min(len);
        let end = start.saturating_add(block).min(len);

        Self { start, end }
    }

    /// First index of the block.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last index of the block.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of elements in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        // start <= end is guaranteed by construction.
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if no elements are assigned to this worker.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The half-open index range `[start, end)` of the block.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Borrows this partition's block out of the slice the partition was
    /// computed for.
    #[must_use]
    pub fn of<'a, T>(&self, values: &'a [T]) -> &'a [T] {
        values
            .get(self.range())
            .expect("partition ranges are clamped to the workload length at construction")
    }
}
