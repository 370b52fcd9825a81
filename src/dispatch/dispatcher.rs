//! Command registry and dispatch loop.
//!
//! # Responsibilities
//! - Register commands under their qualified name
//! - Invoke the command's active handler for each interaction
//! - Report every failure to the chain of error hooks
//!
//! # Design Decisions
//! - Error hooks form a chain; installing one never displaces another
//! - The handler is loaded from the slot per invocation, never cached
//! - Hooks run synchronously after the failure, before `dispatch` returns

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::dispatch::command::{Command, CommandId, Handler};
use crate::dispatch::error::CommandError;
use crate::dispatch::interaction::Interaction;

/// Observer of failed invocations.
///
/// Implementations must be re-entrant: hooks can be called concurrently for
/// overlapping failures.
pub trait ErrorHook: Send + Sync {
    fn on_command_error(&self, interaction: &Interaction, error: &CommandError);
}

impl<F> ErrorHook for F
where
    F: Fn(&Interaction, &CommandError) + Send + Sync,
{
    fn on_command_error(&self, interaction: &Interaction, error: &CommandError) {
        self(interaction, error)
    }
}

/// In-process command dispatcher.
pub struct Dispatcher {
    commands: DashMap<String, Arc<Command>>,
    next_id: AtomicU64,
    hooks: ArcSwap<Vec<Arc<dyn ErrorHook>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            commands: DashMap::new(),
            next_id: AtomicU64::new(1),
            hooks: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Register a command. A command registered under an existing name
    /// replaces it and gets a fresh identity.
    pub fn register(&self, qualified_name: impl Into<String>, handler: Handler) -> Arc<Command> {
        let name = qualified_name.into();
        let id = CommandId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let command = Arc::new(Command::new(id, name.clone(), handler));

        if self.commands.insert(name.clone(), command.clone()).is_some() {
            tracing::debug!(command = %name, id = %id, "Replaced existing command");
        }
        command
    }

    pub fn command(&self, qualified_name: &str) -> Option<Arc<Command>> {
        self.commands.get(qualified_name).map(|r| r.value().clone())
    }

    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.iter().map(|r| r.value().clone()).collect()
    }

    /// Append a hook to the error chain.
    pub fn add_error_hook(&self, hook: Arc<dyn ErrorHook>) {
        self.hooks.rcu(|hooks| {
            let mut hooks = Vec::clone(hooks);
            hooks.push(hook.clone());
            hooks
        });
    }

    pub fn error_hook_count(&self) -> usize {
        self.hooks.load().len()
    }

    /// Invoke a command by name on behalf of `user_id`.
    pub async fn dispatch(&self, qualified_name: &str, user_id: u64) -> Result<(), CommandError> {
        let Some(command) = self.command(qualified_name) else {
            let interaction = Interaction::detached(user_id);
            let error = CommandError::UnknownCommand(qualified_name.to_string());
            self.report(&interaction, &error);
            return Err(error);
        };

        let interaction = Interaction::new(Some(command.clone()), user_id);
        tracing::debug!(
            command = %command.qualified_name(),
            interaction = %interaction.id(),
            "Dispatching command"
        );

        let handler = command.handler();
        match handler(interaction.clone()).await {
            Ok(()) => Ok(()),
            Err(source) => {
                let error = CommandError::invoke(command.qualified_name(), source);
                tracing::debug!(
                    command = %command.qualified_name(),
                    interaction = %interaction.id(),
                    elapsed_ms = interaction.received_at().elapsed().as_millis() as u64,
                    "Command failed"
                );
                self.report(&interaction, &error);
                Err(error)
            }
        }
    }

    /// Run every error hook for a failed interaction.
    pub fn report(&self, interaction: &Interaction, error: &CommandError) {
        let hooks = self.hooks.load();
        if hooks.is_empty() {
            tracing::error!(interaction = %interaction.id(), error = %error, "Unhandled command error");
            return;
        }
        for hook in hooks.iter() {
            hook.on_command_error(interaction, error);
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::command::handler_fn;
    use crate::dispatch::error::ErrorKind;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_dispatch_success() {
        let dispatcher = Dispatcher::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        dispatcher.register(
            "ping",
            handler_fn(move |_| {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        dispatcher.dispatch("ping", 1).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_hook() {
        let dispatcher = Dispatcher::new();
        dispatcher.register(
            "fail",
            handler_fn(|_| async { Err(CommandError::timeout("slow")) }),
        );

        let seen = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let seen = seen.clone();
            dispatcher.add_error_hook(Arc::new(move |i: &Interaction, e: &CommandError| {
                assert!(i.command().is_some());
                assert_eq!(e.effective_kind(), ErrorKind::Timeout);
                seen.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(dispatcher.error_hook_count(), 2);

        let err = dispatcher.dispatch("fail", 1).await.unwrap_err();
        assert!(matches!(err, CommandError::Invoke { .. }));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_command_reports_detached_interaction() {
        let dispatcher = Dispatcher::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        dispatcher.add_error_hook(Arc::new(move |i: &Interaction, _: &CommandError| {
            assert!(i.command().is_none());
            s.fetch_add(1, Ordering::SeqCst);
        }));

        let err = dispatcher.dispatch("missing", 1).await.unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand(_)));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_register_assigns_unique_ids() {
        let dispatcher = Dispatcher::new();
        let handler = handler_fn(|_| async { Ok(()) });
        let a = dispatcher.register("a", handler.clone());
        let b = dispatcher.register("b", handler.clone());
        let a2 = dispatcher.register("a", handler);

        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), a2.id());
        assert_eq!(dispatcher.command("a").unwrap().id(), a2.id());
        assert_eq!(dispatcher.commands().len(), 2);
    }
}
