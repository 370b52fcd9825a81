//! Per-command circuit breaker for in-process command dispatch.
//!
//! When a command's handler keeps failing, the breaker swaps it for a shared
//! fallback handler and restores it after a cool-down.
//!
//! ```no_run
//! use std::time::Duration;
//! use command_breaker::{handler_fn, BreakerConfig, CommandBreaker, CommandError, Dispatcher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new();
//! dispatcher.register("test", handler_fn(|_| async { Err(CommandError::internal("boom")) }));
//!
//! let breaker = CommandBreaker::new(BreakerConfig::new(3, Duration::from_secs(60)))?;
//! breaker.on_tripped_call(handler_fn(|_| async { Ok(()) }));
//! breaker.install(&dispatcher);
//! # Ok(())
//! # }
//! ```

pub mod breaker;
pub mod config;
pub mod dispatch;
pub mod observability;

pub use breaker::{BreakerError, BreakerStatus, CircuitState, CommandBreaker};
pub use config::{AppConfig, BreakerConfig};
pub use dispatch::{handler_fn, Command, CommandError, Dispatcher, ErrorHook, ErrorKind, Handler, Interaction};
