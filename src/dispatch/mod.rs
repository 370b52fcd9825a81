//! Host dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher.rs: dispatch(name, user)
//!     → resolve Command (command.rs)
//!     → build Interaction (interaction.rs)
//!     → load handler from the command's HandlerSlot
//!     → await handler
//!     → on Err: wrap in CommandError::Invoke (error.rs)
//!               → every ErrorHook in the chain
//! ```
//!
//! # Design Decisions
//! - Handlers are reached through a slot, so they can be swapped at runtime
//! - Error hooks are composable; the breaker is just one of them
//! - Failures carry an ErrorKind so observers can filter on category

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod interaction;

pub use command::{handler_fn, Command, CommandId, Handler};
pub use dispatcher::{Dispatcher, ErrorHook};
pub use error::{CommandError, ErrorKind};
pub use interaction::Interaction;
