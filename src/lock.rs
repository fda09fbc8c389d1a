//! Critical sections scoped to a single operation or piece of state

use std::sync::{Mutex, PoisonError};

/// A lock owned by one operation (or one group of operations sharing state).
///
/// Every call to [`OperationLock::run`] on the same instance is serialized.
/// The guard is dropped on every exit path, including early `?` returns and
/// unwinding; a poisoned lock is recovered rather than propagated.
pub struct OperationLock<T = ()> {
    name: &'static str,
    inner: Mutex<T>,
}

impl<T> OperationLock<T> {
    pub const fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            inner: Mutex::new(value),
        }
    }

    /// Block until the lock is free, then run `op` with exclusive access.
    pub fn run<R>(&self, op: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!(lock = self.name, "Lock acquired");
        op(&mut guard)
    }
}

impl OperationLock {
    pub const fn unit(name: &'static str) -> Self {
        Self::new(name, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn calls_never_overlap() {
        let lock = Arc::new(OperationLock::unit("test"));
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    lock.run(|_| {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn released_after_error() {
        let lock = OperationLock::new("counter", 0u32);
        let result: Result<(), &str> = lock.run(|count| {
            *count += 1;
            Err("boom")
        });
        assert!(result.is_err());
        assert_eq!(lock.run(|count| *count), 1);
    }

    #[test]
    fn released_after_panic() {
        let lock = Arc::new(OperationLock::new("counter", 0u32));
        let panicking = Arc::clone(&lock);
        let joined = thread::spawn(move || {
            panicking.run(|count| {
                *count += 1;
                if *count > 0 {
                    panic!("inside critical section");
                }
            })
        })
        .join();
        assert!(joined.is_err());
        assert_eq!(lock.run(|count| *count), 1);
    }
}
