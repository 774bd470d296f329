//! Support types referenced by the code that [`generate_mock!`] expands to.
//!
//! Nothing here is specific to any one mock; the macro emits fields of these
//! types and calls into them by absolute path (`::genmock::runtime::...`), so
//! user code normally never names them directly.
//!
//! [`generate_mock!`]: crate::generate_mock

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

/// Error type produced by `try` handlers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Future type produced by `async` handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Append-only record of the argument tuples a trampoline has seen.
///
/// Locking recovers from poisoning: a panicking handler must not take the
/// accounting a test is about to assert on down with it.
pub struct ArgLog<T> {
    values: Mutex<Vec<T>>,
}

impl<T> ArgLog<T> {
    pub fn new() -> Self {
        ArgLog {
            values: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, value: T) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }

    pub fn len(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the recorded entries, in call order.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T> Default for ArgLog<T> {
    fn default() -> Self {
        ArgLog::new()
    }
}

/// Storage for the currently active handler of one closure field.
///
/// The trampoline reads the handler through [`with`](HandlerCell::with) at
/// the moment of each invocation, so replacing it between calls changes the
/// behavior of the next call only.
pub struct HandlerCell<F: ?Sized> {
    handler: Mutex<Arc<F>>,
}

impl<F: ?Sized> HandlerCell<F> {
    pub fn new(handler: Box<F>) -> Self {
        HandlerCell {
            handler: Mutex::new(Arc::from(handler)),
        }
    }

    pub fn replace(&self, handler: Box<F>) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Arc::from(handler);
    }

    /// Run `call` with the handler that is current at this moment.
    ///
    /// The handler is cloned out under a short-lived lock; the lock is never
    /// held while the handler runs, so a handler may itself replace the
    /// cell's contents for subsequent calls.
    pub fn with<R>(&self, call: impl FnOnce(&F) -> R) -> R {
        let handler = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        call(&handler)
    }
}

/// Placeholder installed by every generated `new` for handlers that have not
/// been configured yet. `tag` names the offending handler, e.g.
/// `"ApiClientMock::fetch_handler"`.
///
/// ```should_panic
/// let _: i64 = genmock::unimplemented("ApiClientMock::fetch_handler");
/// ```
#[track_caller]
pub fn unimplemented<T>(tag: &str) -> T {
    panic!("unconfigured mock handler invoked: {}", tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_log_records_in_order() {
        let log = ArgLog::new();
        log.push((1, "a"));
        log.push((2, "b"));
        assert_eq!(log.len(), 2);
        assert!(!log.is_empty());
        assert_eq!(log.snapshot(), vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn handler_cell_reads_current_handler() {
        let cell: HandlerCell<dyn Fn(i64) -> i64 + Send + Sync> =
            HandlerCell::new(Box::new(|n| n + 1));
        assert_eq!(cell.with(|f| f(1)), 2);
        cell.replace(Box::new(|n| n * 10));
        assert_eq!(cell.with(|f| f(1)), 10);
    }

    #[test]
    fn arg_log_survives_a_poisoning_panic() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        use std::sync::Arc;

        let log = Arc::new(ArgLog::new());
        log.push(1);
        let inner = Arc::clone(&log);
        let _ = catch_unwind(AssertUnwindSafe(move || {
            inner.push(2);
            panic!("handler exploded");
        }));
        assert_eq!(log.snapshot(), vec![1, 2]);
    }
}
