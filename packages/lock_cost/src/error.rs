use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors that can occur when setting up or running a benchmark session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The allocator refused to provide memory for a workload of the
    /// requested size. Expected eventually when the driver loop is allowed
    /// to grow the workload far enough.
    #[error("failed to allocate a workload of {len} elements: {source}")]
    WorkloadAllocation {
        /// Number of elements that was requested.
        len: usize,

        /// The allocator's refusal.
        #[source]
        source: TryReserveError,
    },

    /// The operating system refused to spawn a worker thread.
    #[error("failed to spawn worker thread {worker}: {source}")]
    ThreadSpawn {
        /// Zero-based index of the worker that could not be spawned.
        worker: usize,

        /// The underlying spawn failure.
        #[source]
        source: io::Error,
    },

    /// A report line could not be written to the output stream.
    #[error("failed to write a report line: {source}")]
    Report {
        /// The underlying write failure.
        #[source]
        source: io::Error,
    },

    /// The cross-process named mutex could not be created.
    #[error("failed to create named mutex '{name}': {source}")]
    NamedMutex {
        /// The system-wide name the mutex was to be registered under.
        name: String,

        /// The underlying operating system error.
        #[source]
        source: io::Error,
    },
}

/// A specialized `Result` type for benchmark operations, returning the
/// crate's [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
