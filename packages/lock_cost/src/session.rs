use std::num::NonZero;

use crate::pool::WorkerPool;
use crate::racy_cell::RacyCell;
use crate::{LightLock, NamedMutex, Partition, Result, Stopwatch, Strategy, Trial, Workload};

/// One benchmark session: the worker pool and the two process-wide locks,
/// created once and reused across every trial and driver iteration.
///
/// Owning all shared state in one place (instead of the ambient globals the
/// naive formulation of this benchmark invites) keeps sessions restartable
/// and independently testable. Workers receive everything they touch by
/// reference from the session; accumulators are reset at the start of each
/// trial and read only after the per-strategy join barrier.
///
/// # Examples
///
/// ```
/// use lock_cost::{Session, Workload};
/// use new_zealand::nz;
///
/// # fn main() -> Result<(), lock_cost::Error> {
/// let mut session = Session::new(nz!(4))?;
/// let workload = Workload::all_ones(10_000)?;
///
/// // The synchronized strategies are exact on every run.
/// assert_eq!(session.run_named_mutex(&workload).total(), 10_000.0);
/// assert_eq!(session.run_light_lock(&workload).total(), 10_000.0);
/// assert_eq!(session.run_subtotal(&workload).total(), 10_000.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    pool: WorkerPool,
    named: NamedMutex,
    light: LightLock,
}

impl Session {
    /// Creates a session with `workers` pre-warmed worker threads and fresh
    /// locks.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned or the named
    /// mutex cannot be created.
    pub fn new(workers: NonZero<usize>) -> Result<Self> {
        Ok(Self {
            pool: WorkerPool::new(workers)?,
            named: NamedMutex::new()?,
            light: LightLock::new(),
        })
    }

    /// Number of worker threads the parallel strategies run on.
    #[must_use]
    pub fn worker_count(&self) -> NonZero<usize> {
        self.pool.worker_count()
    }

    /// Light-lock acquisitions recorded during the most recent trial that
    /// used the light lock.
    #[must_use]
    pub fn light_lock_acquisitions(&self) -> u64 {
        self.light.acquisitions()
    }

    /// Named-mutex acquisitions recorded during the most recent trial that
    /// used the named mutex.
    #[must_use]
    pub fn named_mutex_acquisitions(&self) -> u64 {
        self.named.acquisitions()
    }

    /// Sums the workload on the calling thread, left to right.
    pub fn run_sequential(&mut self, workload: &Workload) -> Trial {
        let watch = Stopwatch::start_new();

        let mut total = 0.0;
        for value in workload.values() {
            total += value;
        }

        Trial::new(Strategy::Sequential, workload.len(), total, watch.elapsed())
    }

    /// Sums the workload in parallel with no synchronization at all.
    ///
    /// This is an intentional data race: under real parallelism, workers
    /// overwrite each other's read-modify-write cycles and the total is
    /// typically less than the correct value. The result is unspecified by
    /// design; the strategy exists to be compared against, not trusted.
    pub fn run_naive(&mut self, workload: &Workload) -> Trial {
        let workers = self.pool.worker_count();
        let values = workload.values();
        let total = RacyCell::new(0.0);

        let watch = Stopwatch::start_new();
        self.pool.run_on_all(|worker| {
            let partition = Partition::for_worker(worker, workers, values.len());

            for value in partition.of(values) {
                // SAFETY: none to offer - the unsynchronized concurrent
                // accumulation is the behavior under measurement.
                unsafe {
                    total.add(*value);
                }
            }
        });
        let elapsed = watch.elapsed();

        Trial::new(Strategy::Naive, values.len(), total.into_inner(), elapsed)
    }

    /// Sums the workload in parallel, acquiring the cross-process named
    /// mutex around every single element addition.
    ///
    /// Exact on every run - all increments are serialized - at the cost of
    /// one full acquisition/release round-trip per element.
    pub fn run_named_mutex(&mut self, workload: &Workload) -> Trial {
        let workers = self.pool.worker_count();
        self.named.reset();

        let values = workload.values();
        let named = &self.named;

        let watch = Stopwatch::start_new();
        self.pool.run_on_all(|worker| {
            let partition = Partition::for_worker(worker, workers, values.len());

            for value in partition.of(values) {
                *named.lock() += value;
            }
        });
        let elapsed = watch.elapsed();

        Trial::new(
            Strategy::NamedMutex,
            values.len(),
            self.named.total(),
            elapsed,
        )
    }

    /// Sums the workload in parallel, acquiring the in-process light lock
    /// around every single element addition.
    ///
    /// Same per-element locking pattern and the same exactness guarantee as
    /// [`run_named_mutex()`][Self::run_named_mutex]; the point of the
    /// comparison is the cheaper uncontended acquisition.
    pub fn run_light_lock(&mut self, workload: &Workload) -> Trial {
        let workers = self.pool.worker_count();
        self.light.reset();

        let values = workload.values();
        let light = &self.light;

        let watch = Stopwatch::start_new();
        self.pool.run_on_all(|worker| {
            let partition = Partition::for_worker(worker, workers, values.len());

            for value in partition.of(values) {
                *light.lock() += value;
            }
        });
        let elapsed = watch.elapsed();

        Trial::new(
            Strategy::LightLock,
            values.len(),
            self.light.total(),
            elapsed,
        )
    }

    /// Sums the workload in parallel via private per-worker subtotals, each
    /// folded into the shared total under a single light-lock acquisition.
    ///
    /// Exact on every run with only `worker_count` lock acquisitions per
    /// trial, no matter how large the workload. Every worker folds, even one
    /// with an empty partition, so the acquisition count is exactly the
    /// worker count.
    pub fn run_subtotal(&mut self, workload: &Workload) -> Trial {
        let workers = self.pool.worker_count();
        self.light.reset();

        let values = workload.values();
        let light = &self.light;

        let watch = Stopwatch::start_new();
        self.pool.run_on_all(|worker| {
            let partition = Partition::for_worker(worker, workers, values.len());

            let mut subtotal = 0.0;
            for value in partition.of(values) {
                subtotal += value;
            }

            // The only synchronization in this strategy's hot path: one
            // acquisition per worker to fold the subtotal in.
            *light.lock() += subtotal;
        });
        let elapsed = watch.elapsed();

        Trial::new(
            Strategy::Subtotal,
            values.len(),
            self.light.total(),
            elapsed,
        )
    }

    /// Runs all five strategies on the workload in the fixed reporting
    /// order: sequential, naive, named mutex, light lock, subtotal.
    pub fn run_all(&mut self, workload: &Workload) -> Vec<Trial> {
        vec![
            self.run_sequential(workload),
            self.run_naive(workload),
            self.run_named_mutex(workload),
            self.run_light_lock(workload),
            self.run_subtotal(workload),
        ]
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::float_cmp,
        reason = "all-ones sums are exact in binary floating point"
    )]
    #![allow(clippy::indexing_slicing, reason = "test code with known array bounds")]

    use new_zealand::nz;

    use super::*;

    #[test]
    fn sequential_is_exact() {
        let mut session = Session::new(nz!(4)).unwrap();
        let workload = Workload::all_ones(1_000).unwrap();

        let trial = session.run_sequential(&workload);

        assert_eq!(trial.total(), 1_000.0);
        assert_eq!(trial.strategy(), Strategy::Sequential);
        assert_eq!(trial.len(), 1_000);
    }

    #[test]
    fn naive_is_exact_with_a_single_worker() {
        // With one worker there is no second thread to race against.
        let mut session = Session::new(nz!(1)).unwrap();
        let workload = Workload::all_ones(1_000).unwrap();

        assert_eq!(session.run_naive(&workload).total(), 1_000.0);
    }

    #[test]
    fn synchronized_strategies_are_exact() {
        let mut session = Session::new(nz!(4)).unwrap();
        let workload = Workload::all_ones(1_000).unwrap();

        assert_eq!(session.run_named_mutex(&workload).total(), 1_000.0);
        assert_eq!(session.run_light_lock(&workload).total(), 1_000.0);
        assert_eq!(session.run_subtotal(&workload).total(), 1_000.0);
    }

    #[test]
    fn strategies_handle_more_workers_than_elements() {
        let mut session = Session::new(nz!(8)).unwrap();
        let workload = Workload::all_ones(3).unwrap();

        assert_eq!(session.run_named_mutex(&workload).total(), 3.0);
        assert_eq!(session.run_light_lock(&workload).total(), 3.0);
        assert_eq!(session.run_subtotal(&workload).total(), 3.0);
    }

    #[test]
    fn strategies_handle_empty_workloads() {
        let mut session = Session::new(nz!(4)).unwrap();
        let workload = Workload::all_ones(0).unwrap();

        for trial in session.run_all(&workload) {
            assert_eq!(trial.total(), 0.0);
            assert!(trial.is_empty());
        }
    }

    #[test]
    fn per_element_locking_acquires_once_per_element() {
        let mut session = Session::new(nz!(4)).unwrap();
        let workload = Workload::all_ones(1_000).unwrap();

        session.run_light_lock(&workload);
        assert_eq!(session.light_lock_acquisitions(), 1_000);

        session.run_named_mutex(&workload);
        assert_eq!(session.named_mutex_acquisitions(), 1_000);
    }

    #[test]
    fn run_all_reports_in_fixed_order() {
        let mut session = Session::new(nz!(2)).unwrap();
        let workload = Workload::all_ones(10).unwrap();

        let trials = session.run_all(&workload);

        let order: Vec<_> = trials.iter().map(|trial| trial.strategy()).collect();
        assert_eq!(
            order,
            vec![
                Strategy::Sequential,
                Strategy::Naive,
                Strategy::NamedMutex,
                Strategy::LightLock,
                Strategy::Subtotal,
            ]
        );
    }

    #[test]
    fn sessions_are_reusable_across_workloads() {
        let mut session = Session::new(nz!(4)).unwrap();

        for len in [10, 100, 1_000] {
            let workload = Workload::all_ones(len).unwrap();
            assert_eq!(session.run_subtotal(&workload).total(), workload.expected_total());
        }
    }
}
