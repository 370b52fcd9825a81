//! Circuit breaker subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher reports a failed interaction (ErrorHook):
//!     → controller.rs resolves the command (none → drop)
//!     → command already open → drop
//!     → filter.rs (ignored kind → drop, logged)
//!     → tracker.rs increments the failure count
//!     → count >= threshold → trip:
//!         swap handler slot to the fallback
//!         scheduler.rs arms a one-shot reset
//!
//! Reset fires:
//!     → restore original handler
//!     → tracker.rs clears the count
//! ```
//!
//! # Design Decisions
//! - Per-command breaker, one shared fallback
//! - Trip is one-shot per open episode; the timer armed at trip is authoritative
//! - No half-open probing: the reset reopens traffic fully
//! - The breaker never returns an error to the reporter

use thiserror::Error;

use crate::config::validation::{describe, ValidationError};

pub mod controller;
pub mod filter;
pub mod scheduler;
pub mod tracker;

pub use controller::{BreakerStatus, CircuitState, CommandBreaker};
pub use filter::ExceptionFilter;
pub use scheduler::{ResetScheduler, ResetTask, ScheduledReset, TokioResetScheduler};
pub use tracker::ErrorTracker;

/// Errors raised while constructing a breaker.
#[derive(Debug, Error)]
pub enum BreakerError {
    #[error("invalid breaker config: {}", describe(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("no Tokio runtime available to schedule resets")]
    NoRuntime,
}
