//! Runs blocking operations in the background and reports through callbacks

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tokio::runtime::{Handle, TryCurrentError};

use crate::error::{ClientError, Result};

/// Spawns one blocking task per call on a tokio runtime.
///
/// The synchronous implementation stays canonical; this only moves it off the
/// caller's thread. Results of separate calls arrive in no particular order.
#[derive(Clone)]
pub struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Dispatcher bound to the runtime of the calling context.
    pub fn current() -> std::result::Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    /// Run `op` on a blocking worker and hand its outcome to `callback`.
    ///
    /// Returns immediately. `callback` is invoked exactly once, on the worker,
    /// with either the value or the error; `extra` is passed back untouched.
    /// A panic inside `op` is delivered as [`ClientError::Aborted`].
    pub fn dispatch<T, F, C, X>(&self, operation: &'static str, op: F, callback: C, extra: X)
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
        C: FnOnce(Result<T>, X) + Send + 'static,
        X: Send + 'static,
    {
        tracing::trace!(operation, "Dispatching");
        self.handle.spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(op))
                .unwrap_or_else(|payload| Err(ClientError::Aborted(panic_message(payload.as_ref()))));

            match &result {
                Ok(_) => tracing::debug!(operation, "Async operation finished"),
                Err(e) => tracing::error!(operation, error = %e, "Async operation failed"),
            }
            callback(result, extra);
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tokio::sync::oneshot;

    #[tokio::test(flavor = "multi_thread")]
    async fn delivers_value_on_another_thread() {
        let dispatcher = Dispatcher::current().unwrap();
        let caller = thread::current().id();
        let (tx, rx) = oneshot::channel();

        dispatcher.dispatch(
            "test",
            || Ok(42),
            move |result: Result<i32>, extra| {
                let _ = tx.send((result.ok(), extra, thread::current().id()));
            },
            "ctx",
        );

        let (value, extra, worker) = rx.await.unwrap();
        assert_eq!(value, Some(42));
        assert_eq!(extra, "ctx");
        assert_ne!(worker, caller);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panics_become_errors() {
        let dispatcher = Dispatcher::current().unwrap();
        let (tx, rx) = oneshot::channel();

        dispatcher.dispatch(
            "test",
            || -> Result<()> { panic!("kaboom") },
            move |result, ()| {
                let _ = tx.send(result);
            },
            (),
        );

        match rx.await.unwrap() {
            Err(ClientError::Aborted(message)) => assert_eq!(message, "kaboom"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn current_fails_outside_runtime() {
        assert!(Dispatcher::current().is_err());
    }
}
