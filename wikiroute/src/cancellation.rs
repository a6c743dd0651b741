//! Cooperative cancellation of route searches.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::warn;

use crate::errors::RouteError;

type CancelCallback = Box<dyn Fn() + Send + Sync>;

/// A token a caller can use to stop a running search.
///
/// The search checks the token before every pop from its frontier and also
/// stops waiting on an in-flight page expansion once the token fires. Only
/// the first cancellation reason is kept.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: RwLock<Option<String>>,
    callbacks: RwLock<Vec<CancelCallback>>,
    notify: Notify,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Later calls are ignored.
    ///
    /// Registered callbacks run immediately, once each, and are then
    /// released; a panicking callback is logged and does not stop the
    /// others. Tasks waiting in [`cancelled`](Self::cancelled) wake up.
    pub fn cancel(&self, reason: impl Into<String>) {
        let callbacks = {
            // The flag flips under the callback lock so `on_cancel` never
            // registers a callback that this call would miss.
            let mut callbacks = self.callbacks.write();
            if self
                .cancelled
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return;
            }
            *self.reason.write() = Some(reason.into());
            std::mem::take(&mut *callbacks)
        };

        self.notify.notify_waiters();
        for callback in &callbacks {
            Self::invoke(callback.as_ref());
        }
    }

    /// Registers a callback to run on cancellation, or runs it right away
    /// when the token is already cancelled.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        {
            let mut callbacks = self.callbacks.write();
            if !self.is_cancelled() {
                callbacks.push(Box::new(callback));
                return;
            }
        }
        Self::invoke(&callback);
    }

    /// Completes once the token has been cancelled.
    ///
    /// Holds no registration after it returns or is dropped, so one token
    /// can be awaited by any number of searches.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The first cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Fails with [`RouteError::Cancelled`] once the token has fired.
    pub fn check(&self) -> Result<(), RouteError> {
        if self.is_cancelled() {
            Err(self.to_error())
        } else {
            Ok(())
        }
    }

    pub(crate) fn to_error(&self) -> RouteError {
        RouteError::Cancelled(self.reason().unwrap_or_else(|| "cancelled".to_string()))
    }

    #[cfg(test)]
    pub(crate) fn callback_count(&self) -> usize {
        self.callbacks.read().len()
    }

    fn invoke(callback: &(dyn Fn() + Send + Sync)) {
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(callback)) {
            warn!("Cancellation callback panicked: {:?}", e);
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_new_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel("user pressed ctrl-c");
        token.cancel("second");

        assert!(token.is_cancelled());
        assert_eq!(token.reason().as_deref(), Some("user pressed ctrl-c"));
        match token.check() {
            Err(RouteError::Cancelled(reason)) => assert_eq!(reason, "user pressed ctrl-c"),
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[test]
    fn test_callbacks_run_once_on_cancel() {
        let token = CancellationToken::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        token.on_cancel(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        token.cancel("stop");
        token.cancel("stop again");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_callback_runs_immediately() {
        let token = CancellationToken::new();
        token.cancel("stop");

        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        token.on_cancel(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let token = CancellationToken::new();
        token.on_cancel(|| panic!("boom"));
        token.cancel("stop");
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_callbacks_are_released_after_cancel() {
        let token = CancellationToken::new();
        token.on_cancel(|| {});
        token.on_cancel(|| {});
        assert_eq!(token.callback_count(), 2);

        token.cancel("stop");
        assert_eq!(token.callback_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiting_task() {
        let token = Arc::new(CancellationToken::new());
        let waiter = {
            let token = Arc::clone(&token);
            tokio::spawn(async move { token.cancelled().await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        token.cancel("stop");
        tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_returns_at_once_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel("stop");
        tokio::time::timeout(std::time::Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
    }

    #[test]
    fn test_concurrent_registration_never_misses_cancel() {
        for _ in 0..50 {
            let token = Arc::new(CancellationToken::new());
            let counter = Arc::new(AtomicUsize::new(0));

            let registrar = {
                let token = Arc::clone(&token);
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        let seen = Arc::clone(&counter);
                        token.on_cancel(move || {
                            seen.fetch_add(1, Ordering::SeqCst);
                        });
                    }
                })
            };
            token.cancel("stop");
            registrar.join().unwrap();

            assert_eq!(counter.load(Ordering::SeqCst), 20);
        }
    }
}
