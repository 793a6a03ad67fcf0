//! Microbenchmark comparing the cost of synchronization strategies for
//! parallel summation.
//!
//! This package measures what different synchronization disciplines cost when
//! a fixed set of worker threads sums a shared array of `f64` values. The same
//! workload is summed five ways:
//!
//! - **Sequential** - single-threaded left-to-right fold, the correctness and
//!   timing baseline.
//! - **Naive parallel** - every worker adds directly into one shared total
//!   with no synchronization at all. This is a deliberate data race and
//!   typically loses updates; it exists to show what "fast but wrong" looks
//!   like.
//! - **Named-mutex parallel** - one acquisition of a cross-process-capable
//!   named lock per element.
//! - **Light-lock parallel** - one acquisition of an in-process lock per
//!   element.
//! - **Subtotal parallel** - each worker sums its partition into a private
//!   subtotal, then folds it into the shared total under a single light-lock
//!   acquisition. The fast *and* correct variant, and the lesson of the
//!   benchmark: move synchronization out of the hot loop.
//!
//! # Operating principles
//!
//! All shared state lives in a [`Session`]: a pre-warmed pool of worker
//! threads plus the two locks, created once and reused across every trial.
//! Each trial partitions the workload into contiguous per-worker blocks,
//! dispatches the strategy to every worker, and reads the accumulator only
//! after all workers have finished. No lock is ever held across elements,
//! so no lock-ordering deadlock is possible.
//!
//! The [`run`] driver grows the workload geometrically (10, 100, 1000, ...)
//! for a configurable number of iterations, printing one report line per
//! measurement.
//!
//! # Example
//!
//! ```
//! use lock_cost::{Session, Workload};
//! use new_zealand::nz;
//!
//! # fn main() -> Result<(), lock_cost::Error> {
//! let mut session = Session::new(nz!(2))?;
//! let workload = Workload::all_ones(1_000)?;
//!
//! let trial = session.run_subtotal(&workload);
//! assert_eq!(trial.total(), 1_000.0);
//! println!("{trial}");
//! # Ok(())
//! # }
//! ```

mod driver;
mod error;
mod light_lock;
mod named_mutex;
mod partition;
mod pool;
mod racy_cell;
mod session;
mod stopwatch;
mod trial;
mod workload;

pub use driver::*;
pub use error::*;
pub use light_lock::*;
pub use named_mutex::*;
pub use partition::*;
pub use session::*;
pub use stopwatch::*;
pub use trial::*;
pub use workload::*;
