use std::cell::UnsafeCell;
use std::ffi::CString;
use std::io;
use std::ops::{Deref, DerefMut};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Error, Result};

/// Sequence number folded into semaphore names so that multiple instances
/// within one process (e.g. parallel tests) never collide.
static NEXT_NAME: AtomicU64 = AtomicU64::new(0);

/// The cross-process-capable named lock guarding a shared `f64` accumulator.
///
/// Built on a POSIX named semaphore (`sem_open` with an initial count of
/// one), this plays the heavyweight half of the benchmark's lock comparison:
/// a synchronization object registered under a system-wide name, visible to
/// other processes, with every acquisition going through the corresponding
/// system facility. The semaphore name embeds the process id and a sequence
/// number so concurrent benchmark processes and parallel tests do not
/// contend on each other's lock.
///
/// The accumulator is only ever touched through the RAII guard returned by
/// [`lock()`][Self::lock], so all access is mutual-exclusion-protected.
///
/// One instance lives in each [`Session`][crate::Session] for the whole
/// session lifetime; only the accumulator and counter are reset between
/// trials. Dropping the instance closes and unlinks the semaphore.
///
/// # Examples
///
/// ```
/// use lock_cost::NamedMutex;
///
/// let mutex = NamedMutex::new()?;
///
/// *mutex.lock() += 2.5;
/// *mutex.lock() += 2.5;
///
/// assert_eq!(mutex.acquisitions(), 2);
/// # Ok::<(), lock_cost::Error>(())
/// ```
#[derive(Debug)]
pub struct NamedMutex {
    name: CString,
    sem: *mut libc::sem_t,
    total: UnsafeCell<f64>,
    acquisitions: AtomicU64,
}

// SAFETY: the semaphore serializes all access to `total`, the semaphore
// operations themselves are thread-safe, and the handle stays valid until
// drop, which requires exclusive access.
unsafe impl Send for NamedMutex {}
// SAFETY: as above - shared use from multiple threads only ever reaches
// `total` through a held semaphore.
unsafe impl Sync for NamedMutex {}

impl NamedMutex {
    /// Registers a fresh named semaphore with an initial count of one and a
    /// zeroed accumulator behind it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NamedMutex`] if the operating system refuses to
    /// create the semaphore.
    pub fn new() -> Result<Self> {
        let name = format!(
            "/lock_cost.{}.{}",
            process::id(),
            NEXT_NAME.fetch_add(1, Ordering::Relaxed)
        );

        let c_name =
            CString::new(name.clone()).expect("semaphore name is built from digits and dots only");

        // A stale semaphore under this name can only be debris from a
        // crashed earlier process with a reused pid; clear it so O_EXCL
        // below means "freshly ours".
        //
        // SAFETY: valid NUL-terminated name; failure (ENOENT) is benign.
        unsafe {
            libc::sem_unlink(c_name.as_ptr());
        }

        // SAFETY: valid NUL-terminated name; O_CREAT | O_EXCL with an
        // initial count of 1 creates a fresh binary semaphore owned by us.
        let sem = unsafe {
            libc::sem_open(
                c_name.as_ptr(),
                libc::O_CREAT | libc::O_EXCL,
                libc::S_IRUSR | libc::S_IWUSR,
                1_u32,
            )
        };

        if sem == libc::SEM_FAILED {
            return Err(Error::NamedMutex {
                name,
                source: io::Error::last_os_error(),
            });
        }

        Ok(Self {
            name: c_name,
            sem,
            total: UnsafeCell::new(0.0),
            acquisitions: AtomicU64::new(0),
        })
    }

    /// Acquires the lock, blocking until it is available, and counts the
    /// acquisition.
    ///
    /// Waiting is unbounded: no code path acquires this lock while holding
    /// another, so a contention deadlock cannot arise.
    pub fn lock(&self) -> NamedMutexGuard<'_> {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);

        loop {
            // SAFETY: the handle is valid until drop, which cannot run while
            // a `&self` borrow exists.
            let rc = unsafe { libc::sem_wait(self.sem) };
            if rc == 0 {
                break;
            }

            let err = io::Error::last_os_error();
            assert!(
                err.raw_os_error() == Some(libc::EINTR),
                "sem_wait failed on a valid semaphore: {err}"
            );
            // Interrupted by a signal; retry.
        }

        NamedMutexGuard { lock: self }
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
        *self.total.get_mut() = 0.0;
        *self.acquisitions.get_mut() = 0;
    }

    /// Reads the accumulator without locking. Requires exclusive access,
    /// which proves no worker can be mid-update.
    pub(crate) fn total(&mut self) -> f64 {
        *self.total.get_mut()
    }
}

impl Drop for NamedMutex {
    fn drop(&mut self) {
        // SAFETY: the handle is valid and nothing uses it after drop; unlink
        // removes the system-wide name so no debris outlives the process.
        unsafe {
            libc::sem_close(self.sem);
            libc::sem_unlink(self.name.as_ptr());
        }
    }
}

/// Holds the [`NamedMutex`] locked; releases it on drop.
///
/// Dereferences to the guarded accumulator.
#[derive(Debug)]
pub struct NamedMutexGuard<'a> {
    lock: &'a NamedMutex,
}

impl Deref for NamedMutexGuard<'_> {
    type Target = f64;

    fn deref(&self) -> &f64 {
        // SAFETY: the semaphore is held for the guard's lifetime, so no
        // other thread can touch the accumulator.
        unsafe { &*self.lock.total.get() }
    }
}

impl DerefMut for NamedMutexGuard<'_> {
    fn deref_mut(&mut self) -> &mut f64 {
        // SAFETY: as for `deref`, plus the guard itself is borrowed
        // exclusively.
        unsafe { &mut *self.lock.total.get() }
    }
}

impl Drop for NamedMutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard exists only while the semaphore is held, so the
        // post is balanced with the wait in `lock()`.
        let rc = unsafe { libc::sem_post(self.lock.sem) };
        debug_assert_eq!(rc, 0, "sem_post failed on a held semaphore");
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
        let mutex = NamedMutex::new().unwrap();

        for _ in 0..5 {
            *mutex.lock() += 1.0;
        }

        assert_eq!(mutex.acquisitions(), 5);
    }

    #[test]
    fn reset_zeroes_accumulator_and_counter() {
        let mut mutex = NamedMutex::new().unwrap();

        *mutex.lock() += 3.0;
        mutex.reset();

        assert_eq!(mutex.total(), 0.0);
        assert_eq!(mutex.acquisitions(), 0);
    }

    #[test]
    fn serializes_concurrent_additions() {
        let mutex = NamedMutex::new().unwrap();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1_000 {
                        *mutex.lock() += 1.0;
                    }
                });
            }
        });

        let mut mutex = mutex;
        assert_eq!(mutex.total(), 4_000.0);
    }

    #[test]
    fn instances_do_not_collide() {
        // Two live instances in one process must get distinct names.
        let first = NamedMutex::new().unwrap();
        let second = NamedMutex::new().unwrap();

        *first.lock() += 1.0;
        *second.lock() += 2.0;

        let (mut first, mut second) = (first, second);
        assert_eq!(first.total(), 1.0);
        assert_eq!(second.total(), 2.0);
    }
}
