use std::io::Write;
use std::num::NonZero;

use new_zealand::nz;

use crate::{Error, Result, Session, Workload};

/// Configuration for one benchmark run.
///
/// The defaults reproduce the classic demonstration: 4 workers, workloads of
/// 10 through 10^7 elements, growing by a factor of ten per iteration.
#[derive(Clone, Copy, Debug)]
#[expect(
    clippy::exhaustive_structs,
    reason = "plain configuration data, callers construct it literally"
)]
pub struct BenchConfig {
    /// Number of worker threads for the parallel strategies.
    pub threads: NonZero<usize>,

    /// Workload size for the first iteration.
    pub start_size: usize,

    /// Factor by which the workload grows after each iteration.
    pub growth_factor: NonZero<usize>,

    /// Number of iterations to run before stopping.
    ///
    /// Termination is deliberately explicit: growing by ten forever is just
    /// a slow path to an allocation failure.
    pub max_iterations: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            threads: nz!(4),
            start_size: 10,
            growth_factor: nz!(10),
            max_iterations: 7,
        }
    }
}

/// Runs the growing-workload benchmark loop, writing one report line per
/// measurement to `out`.
///
/// Each iteration announces the current size, allocates a fresh all-ones
/// workload, measures the five strategies in the fixed reporting order and
/// releases the workload before growing the size for the next round.
///
/// Taking the output stream as a parameter keeps the report format
/// assertable in tests; the binary passes a locked stdout.
///
/// # Errors
///
/// Returns an error if the session cannot be set up, a workload allocation
/// fails, or a report line cannot be written; the failing iteration is
/// abandoned, not retried.
pub fn run(config: &BenchConfig, out: &mut impl Write) -> Result<()> {
    let mut session = Session::new(config.threads)?;
    let mut len = config.start_size;

    for _ in 0..config.max_iterations {
        writeln!(out, "N = {len}").map_err(|source| Error::Report { source })?;

        let workload = Workload::all_ones(len)?;

        for trial in session.run_all(&workload) {
            writeln!(out, "{trial}").map_err(|source| Error::Report { source })?;
        }

        drop(workload);

        len = len.saturating_mul(config.growth_factor.get());
    }

    Ok(())
}
