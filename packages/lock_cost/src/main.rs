//! Command-line entry point for the synchronization-cost benchmark.
//!
//! Runs a sequential baseline plus four parallel summation strategies over
//! geometrically growing all-ones workloads, printing one line per
//! measurement:
//!
//! ```text
//! N = 10
//! Sequential total 10.000000, 0.0000002 seconds
//! Parallel total 10.000000, 0.0000703 seconds
//! ParallelWithNamedMutex total 10.000000, 0.0001691 seconds
//! ParallelWithLightLock total 10.000000, 0.0000822 seconds
//! ParallelWithSubtotal total 10.000000, 0.0000542 seconds
//! ```
//!
//! The naive `Parallel` total is intentionally unsynchronized and loses
//! updates once workloads are large enough for the workers to truly overlap.

use std::io;
use std::num::NonZero;
use std::process::ExitCode;

use argh::FromArgs;
use lock_cost::{BenchConfig, run};

/// Compare the cost of synchronization strategies for parallel summation.
#[derive(FromArgs)]
struct Args {
    /// number of worker threads (default: 4)
    #[argh(option, default = "4")]
    threads: usize,

    /// workload size for the first iteration (default: 10)
    #[argh(option, default = "10")]
    start_size: usize,

    /// factor by which the workload grows each iteration (default: 10)
    #[argh(option, default = "10")]
    growth_factor: usize,

    /// number of iterations to run before stopping (default: 7)
    #[argh(option, default = "7")]
    max_iterations: usize,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let Some(threads) = NonZero::new(args.threads) else {
        eprintln!("--threads must be at least 1");
        return ExitCode::FAILURE;
    };

    let Some(growth_factor) = NonZero::new(args.growth_factor) else {
        eprintln!("--growth-factor must be at least 1");
        return ExitCode::FAILURE;
    };

    let config = BenchConfig {
        threads,
        start_size: args.start_size,
        growth_factor,
        max_iterations: args.max_iterations,
    };

    match run(&config, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Benchmark failed: {e}");
            ExitCode::FAILURE
        }
    }
}
