//! Delayed reset scheduling.
//!
//! # Design Decisions
//! - The breaker only sees the [`ResetScheduler`] trait, so tests and hosts
//!   with their own executors can substitute an implementation
//! - Every scheduled reset is a [`ScheduledReset`] the breaker owns per
//!   command, which makes early reset and shutdown cancellable
//! - The wait happens on the runtime; nothing is locked while sleeping

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::breaker::BreakerError;

/// Work to run when the delay elapses.
pub type ResetTask = Box<dyn FnOnce() + Send + 'static>;

/// Arranges a one-shot delayed reset.
///
/// Implementations must not run `task` inside `schedule_once`; the breaker
/// calls it while holding its registry lock.
pub trait ResetScheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: ResetTask) -> ScheduledReset;
}

/// Handle to a pending reset.
#[derive(Debug)]
pub struct ScheduledReset {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledReset {
    pub fn from_join_handle(handle: JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// A handle that cannot be cancelled, for schedulers that track their
    /// own tasks.
    pub fn detached() -> Self {
        Self { handle: None }
    }

    /// Abort the pending reset. Has no effect once it has run.
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_finished())
    }
}

/// Scheduler backed by a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioResetScheduler {
    runtime: Handle,
}

impl TokioResetScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Use the runtime the caller is running on.
    pub fn current() -> Result<Self, BreakerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| BreakerError::NoRuntime)
    }
}

impl ResetScheduler for TokioResetScheduler {
    fn schedule_once(&self, delay: Duration, task: ResetTask) -> ScheduledReset {
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        ScheduledReset::from_join_handle(handle)
    }
}
