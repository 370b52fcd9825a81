//! Command failure types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a command failure.
///
/// Breakers filter on these; the set is closed so configs can name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An upstream call did not answer in time.
    Timeout,
    /// An upstream service asked us to slow down.
    RateLimited,
    /// The invoking user failed a permission check.
    Forbidden,
    /// A referenced entity does not exist.
    NotFound,
    /// The user supplied bad arguments.
    InvalidInput,
    /// A dependency is down.
    Unavailable,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by command handlers or by the dispatcher itself.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A handler failed. Wraps the handler's own error.
    #[error("command /{command} failed: {source}")]
    Invoke {
        command: String,
        #[source]
        source: Box<CommandError>,
    },

    /// A handler failure of a known kind.
    #[error("{kind}: {message}")]
    Failed { kind: ErrorKind, message: String },

    /// No command with that name is registered.
    #[error("unknown command /{0}")]
    UnknownCommand(String),
}

impl CommandError {
    /// Build a handler failure.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CommandError::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Wrap a handler failure with the command that raised it.
    pub fn invoke(command: impl Into<String>, source: CommandError) -> Self {
        CommandError::Invoke {
            command: command.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through any `Invoke` wrappers.
    pub fn root_cause(&self) -> &CommandError {
        let mut current = self;
        while let CommandError::Invoke { source, .. } = current {
            current = source;
        }
        current
    }

    /// Kind of the underlying cause.
    pub fn effective_kind(&self) -> ErrorKind {
        match self.root_cause() {
            CommandError::Failed { kind, .. } => *kind,
            CommandError::UnknownCommand(_) => ErrorKind::NotFound,
            CommandError::Invoke { .. } => ErrorKind::Internal,
        }
    }
}
