//! Shared utilities for breaker integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use command_breaker::{handler_fn, BreakerConfig, CommandBreaker, CommandError, Dispatcher, ErrorKind, Handler};

/// Handler that counts calls and fails with `kind`, or succeeds when `None`.
pub fn counting_handler(calls: Arc<AtomicUsize>, kind: Option<ErrorKind>) -> Handler {
    handler_fn(move |_| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            match kind {
                Some(kind) => Err(CommandError::new(kind, "injected failure")),
                None => Ok(()),
            }
        }
    })
}

/// A dispatcher with an installed breaker and a counting fallback.
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub breaker: CommandBreaker,
    pub fallback_calls: Arc<AtomicUsize>,
    pub fallback: Handler,
}

impl Harness {
    pub fn new(config: BreakerConfig) -> Self {
        Self::with_fallback_result(config, None)
    }

    /// Fallback that fails with `kind` on every call.
    #[allow(dead_code)]
    pub fn with_fallback_result(config: BreakerConfig, kind: Option<ErrorKind>) -> Self {
        let dispatcher = Dispatcher::new();
        let breaker = CommandBreaker::new(config).unwrap();
        let fallback_calls = Arc::new(AtomicUsize::new(0));
        let fallback = breaker.on_tripped_call(counting_handler(fallback_calls.clone(), kind));
        breaker.install(&dispatcher);

        Self {
            dispatcher,
            breaker,
            fallback_calls,
            fallback,
        }
    }

    /// Dispatch `name` `times` times, ignoring results.
    pub async fn invoke(&self, name: &str, times: usize) {
        for user in 0..times {
            let _ = self.dispatcher.dispatch(name, user as u64).await;
        }
    }

    pub fn fallback_calls(&self) -> usize {
        self.fallback_calls.load(Ordering::SeqCst)
    }
}

/// Let paused-clock timers run.
#[allow(dead_code)]
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}
