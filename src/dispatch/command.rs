//! Registered commands and their swappable handler slots.
//!
//! A command never stores its handler directly. Dispatch always goes through
//! the [`HandlerSlot`], so anything holding the `Arc<Command>` can redirect
//! future invocations without touching in-flight ones.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures_util::future::BoxFuture;

use crate::dispatch::error::CommandError;
use crate::dispatch::interaction::Interaction;

/// Future returned by a command handler.
pub type HandlerFuture = BoxFuture<'static, Result<(), CommandError>>;

/// A command handler. Cloning shares the same handler.
pub type Handler = Arc<dyn Fn(Interaction) -> HandlerFuture + Send + Sync>;

/// Wrap an async function or closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Interaction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
{
    Arc::new(move |interaction: Interaction| -> HandlerFuture { Box::pin(f(interaction)) })
}

/// Opaque command identity, unique within one dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub u64);

impl From<u64> for CommandId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Atomically swappable reference to the active handler.
pub struct HandlerSlot {
    current: ArcSwap<Handler>,
}

impl HandlerSlot {
    pub fn new(handler: Handler) -> Self {
        Self {
            current: ArcSwap::from_pointee(handler),
        }
    }

    /// The handler dispatch would use right now.
    pub fn load(&self) -> Handler {
        Handler::clone(&self.current.load())
    }

    /// Install `handler`, returning the one it replaced.
    pub fn replace(&self, handler: Handler) -> Handler {
        let previous = self.current.swap(Arc::new(handler));
        Handler::clone(&previous)
    }
}

/// One registered command.
pub struct Command {
    id: CommandId,
    qualified_name: String,
    slot: HandlerSlot,
}

impl Command {
    pub fn new(id: CommandId, qualified_name: impl Into<String>, handler: Handler) -> Self {
        Self {
            id,
            qualified_name: qualified_name.into(),
            slot: HandlerSlot::new(handler),
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Full name including any parent groups, e.g. `admin ban`.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Currently active handler.
    pub fn handler(&self) -> Handler {
        self.slot.load()
    }

    /// Swap the active handler, returning the previous one.
    pub fn replace_handler(&self, handler: Handler) -> Handler {
        self.slot.replace(handler)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("qualified_name", &self.qualified_name)
            .finish_non_exhaustive()
    }
}
