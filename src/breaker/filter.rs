//! Exception filtering.
//!
//! Decides whether a failure is excluded from counting. Only the effective
//! kind matters: `Invoke` wrappers added by the dispatcher are looked through.

use std::collections::BTreeSet;

use crate::dispatch::error::{CommandError, ErrorKind};

/// Screens reported failures against a set of ignored kinds.
#[derive(Debug, Clone, Default)]
pub struct ExceptionFilter {
    ignored: BTreeSet<ErrorKind>,
}

impl ExceptionFilter {
    pub fn new(ignored: BTreeSet<ErrorKind>) -> Self {
        Self { ignored }
    }

    /// Return true if `error` must not be counted.
    pub fn is_ignored(&self, error: &CommandError) -> bool {
        !self.ignored.is_empty() && self.ignored.contains(&error.effective_kind())
    }

    pub fn ignored_kinds(&self) -> &BTreeSet<ErrorKind> {
        &self.ignored
    }
}
