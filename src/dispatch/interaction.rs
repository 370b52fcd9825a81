//! Interaction context passed to handlers and error hooks.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::dispatch::command::Command;

/// A single user invocation.
///
/// Interactions that did not come from a command (buttons, modals) carry no
/// command and cannot be attributed to a breaker.
#[derive(Debug, Clone)]
pub struct Interaction {
    id: Uuid,
    user_id: u64,
    command: Option<Arc<Command>>,
    received_at: Instant,
}

impl Interaction {
    pub fn new(command: Option<Arc<Command>>, user_id: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            command,
            received_at: Instant::now(),
        }
    }

    /// An interaction with no originating command.
    pub fn detached(user_id: u64) -> Self {
        Self::new(None, user_id)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// The command that produced this interaction, if any.
    pub fn command(&self) -> Option<&Arc<Command>> {
        self.command.as_ref()
    }

    pub fn received_at(&self) -> Instant {
        self.received_at
    }
}
