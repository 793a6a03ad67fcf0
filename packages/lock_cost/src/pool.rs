use std::num::NonZero;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::{iter, mem};

use crate::{Error, Result};

/// Fixed set of pre-warmed worker threads that strategies dispatch onto.
///
/// Spawning threads inside a timed trial would charge thread creation to
/// whichever strategy runs first, so the pool spawns all workers once, up
/// front, and reuses them for every trial of the session. Spawn failure is
/// surfaced as [`Error::ThreadSpawn`] instead of silently proceeding with
/// fewer workers.
///
/// # Lifecycle
///
/// Dropping the pool waits for all workers to finish.
#[derive(Debug)]
pub(crate) struct WorkerPool {
    command_txs: Vec<mpsc::Sender<Command>>,
    join_handles: Vec<JoinHandle<()>>,
    worker_count: NonZero<usize>,
}

impl WorkerPool {
    /// Spawns `workers` threads, each parked on its own command channel.
    pub(crate) fn new(workers: NonZero<usize>) -> Result<Self> {
        let mut command_txs = Vec::with_capacity(workers.get());
        let mut join_handles = Vec::with_capacity(workers.get());

        for worker in 0..workers.get() {
            let (tx, rx) = mpsc::channel();

            let handle = thread::Builder::new()
                .name(format!("lock-cost-{worker}"))
                .spawn(move || worker_entrypoint(&rx))
                .map_err(|source| Error::ThreadSpawn { worker, source })?;

            command_txs.push(tx);
            join_handles.push(handle);
        }

        Ok(Self {
            command_txs,
            join_handles,
            worker_count: workers,
        })
    }

    pub(crate) fn worker_count(&self) -> NonZero<usize> {
        self.worker_count
    }

    /// Executes `f(worker_index)` on every worker, returning only once every
    /// worker has finished - this is the per-strategy join barrier.
    #[expect(
        clippy::needless_pass_by_ref_mut,
        reason = "protects users from deadlock through concurrent usage"
    )]
    pub(crate) fn run_on_all<'f, F>(&mut self, f: F)
    where
        F: Fn(usize) + Clone + Send + 'f,
    {
        // This requires a `&mut` exclusive reference because two concurrent
        // dispatches on the same pool would wait on each other's workers.
        // Internally a shared reference would do.

        let (mut result_txs, result_rxs): (Vec<_>, Vec<_>) =
            iter::repeat_with(oneshot::channel::<()>)
                .take(self.worker_count.get())
                .unzip();

        for (worker, tx) in self.command_txs.iter().enumerate() {
            let f = f.clone();
            let job: Box<dyn FnOnce() + Send + 'f> = Box::new(move || f(worker));

            // Since we guarantee that we wait for all the work to complete,
            // the job does not actually have to be 'static - the type system
            // just requires that because Rust has no compiler-enforced way to
            // guarantee we wait for the work to complete.
            //
            // SAFETY: we block below until every worker has reported
            // completion, so anything the job borrows is still borrowed for
            // as long as the job can run; the 'static is never relied upon.
            let job = unsafe {
                mem::transmute::<Box<dyn FnOnce() + Send + 'f>, Box<dyn FnOnce() + Send + 'static>>(
                    job,
                )
            };

            let result_tx = result_txs
                .pop()
                .expect("type invariant - one result channel per worker");

            tx.send(Command::Execute(Box::new(move || {
                job();

                result_tx
                    .send(())
                    .expect("receiver must still exist - this is mandatory for the join barrier");
            })))
            .expect("worker thread must still exist - the pool cannot operate without workers");
        }

        for rx in result_rxs {
            rx.recv()
                .expect("worker thread failed to report completion - did it panic?");
        }
    }
}

impl Drop for WorkerPool {
    #[cfg_attr(test, mutants::skip)] // Impractical to test that stuff stops happening.
    fn drop(&mut self) {
        if thread::panicking() {
            // We are probably in a dirty state and shutting down may make the
            // problem worse by hiding the original panic, so do nothing.
            return;
        }

        for tx in self.command_txs.drain(..) {
            tx.send(Command::Shutdown)
                .expect("worker threads outlive the pool's command channels");
        }

        for handle in self.join_handles.drain(..) {
            handle
                .join()
                .expect("worker threads only stop when commanded to shut down");
        }
    }
}

enum Command {
    Execute(Box<dyn FnOnce() + Send>),
    Shutdown,
}

fn worker_entrypoint(rx: &mpsc::Receiver<Command>) {
    while let Ok(Command::Execute(job)) = rx.recv() {
        job();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use new_zealand::nz;

    use super::*;

    #[test]
    fn runs_once_per_worker() {
        let mut pool = WorkerPool::new(nz!(4)).unwrap();
        let executions = AtomicUsize::new(0);

        pool.run_on_all(|_| {
            executions.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(executions.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn each_worker_sees_its_own_index() {
        let mut pool = WorkerPool::new(nz!(4)).unwrap();
        let seen = Mutex::new(Vec::new());

        pool.run_on_all(|worker| {
            seen.lock().unwrap().push(worker);
        });

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();

        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn jobs_may_borrow_local_state() {
        let mut pool = WorkerPool::new(nz!(2)).unwrap();
        let values = vec![1, 2, 3];
        let sum = AtomicUsize::new(0);

        pool.run_on_all(|_| {
            sum.fetch_add(values.iter().sum::<usize>(), Ordering::SeqCst);
        });

        assert_eq!(sum.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn pool_is_reusable_across_dispatches() {
        let mut pool = WorkerPool::new(nz!(2)).unwrap();
        let executions = AtomicUsize::new(0);

        for _ in 0..3 {
            pool.run_on_all(|_| {
                executions.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(executions.load(Ordering::SeqCst), 6);
    }
}
