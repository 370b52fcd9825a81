//! Breaker state machine.
//!
//! # States
//! - Closed: the command's own handler runs
//! - Open: the shared fallback runs, a reset is armed
//!
//! # State Transitions
//! ```text
//! Closed → Open: countable failures >= threshold (or a forced trip)
//! Open → Closed: scheduled reset fires, or a manual reset
//! ```
//!
//! The tracker, the open episodes and all slot writes sit behind one lock,
//! so a failure report and a reset for the same command never interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::time::Instant;

use crate::breaker::filter::ExceptionFilter;
use crate::breaker::scheduler::{ResetScheduler, ScheduledReset, TokioResetScheduler};
use crate::breaker::tracker::ErrorTracker;
use crate::breaker::BreakerError;
use crate::config::validation::validate_breaker;
use crate::config::BreakerConfig;
use crate::dispatch::command::{handler_fn, Command, CommandId, Handler};
use crate::dispatch::dispatcher::{Dispatcher, ErrorHook};
use crate::dispatch::error::CommandError;
use crate::dispatch::interaction::Interaction;
use crate::observability::metrics;

/// Breaker state of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
}

/// Point-in-time view of one command's breaker.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStatus {
    pub command: String,
    pub id: u64,
    pub state: CircuitState,
    pub failures: u32,
    /// Milliseconds until the pending reset; `None` while closed.
    pub reset_in_ms: Option<u64>,
}

/// An open period for one command.
struct OpenEpisode {
    command: Arc<Command>,
    original: Handler,
    tripped_at: Instant,
    epoch: u64,
    reset: ScheduledReset,
}

#[derive(Default)]
struct Registry {
    tracker: ErrorTracker,
    /// Commands with a non-zero count, kept for snapshots.
    watched: HashMap<CommandId, Arc<Command>>,
    open: HashMap<CommandId, OpenEpisode>,
    next_epoch: u64,
}

struct BreakerInner {
    config: BreakerConfig,
    filter: ExceptionFilter,
    fallback: ArcSwap<Handler>,
    scheduler: Arc<dyn ResetScheduler>,
    registry: Mutex<Registry>,
}

/// Per-command circuit breaker.
///
/// Cheap to clone; clones share state. Install it into a [`Dispatcher`] with
/// [`CommandBreaker::install`], or forward failures to
/// [`CommandBreaker::report_failure`] from any other error path.
#[derive(Clone)]
pub struct CommandBreaker {
    inner: Arc<BreakerInner>,
}

impl CommandBreaker {
    /// Create a breaker that schedules resets on the current Tokio runtime.
    pub fn new(config: BreakerConfig) -> Result<Self, BreakerError> {
        let scheduler = TokioResetScheduler::current()?;
        Self::with_scheduler(config, Arc::new(scheduler))
    }

    pub fn with_scheduler(
        config: BreakerConfig,
        scheduler: Arc<dyn ResetScheduler>,
    ) -> Result<Self, BreakerError> {
        validate_breaker(&config).map_err(BreakerError::InvalidConfig)?;

        let filter = ExceptionFilter::new(config.ignored_kinds.clone());
        tracing::info!(
            threshold = config.threshold,
            reset_after_ms = config.reset_after_ms,
            ignored_kinds = ?filter.ignored_kinds(),
            "Command breaker initialized"
        );

        Ok(Self {
            inner: Arc::new(BreakerInner {
                config,
                filter,
                fallback: ArcSwap::from_pointee(default_fallback()),
                scheduler,
                registry: Mutex::new(Registry::default()),
            }),
        })
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.inner.config
    }

    /// Append this breaker to the dispatcher's error hook chain.
    pub fn install(&self, dispatcher: &Dispatcher) {
        dispatcher.add_error_hook(Arc::new(self.clone()));
    }

    /// Register the handler used for every open command. Returns it unchanged.
    ///
    /// Commands that are already open keep the fallback they tripped with.
    pub fn on_tripped_call(&self, handler: Handler) -> Handler {
        self.inner.fallback.store(Arc::new(handler.clone()));
        handler
    }

    /// The handler a trip would install right now.
    pub fn fallback(&self) -> Handler {
        Handler::clone(&self.inner.fallback.load())
    }

    /// Failure-report entry point.
    pub fn report_failure(&self, interaction: &Interaction, error: &CommandError) {
        let Some(command) = interaction.command() else {
            return;
        };
        let id = command.id();
        let name = command.qualified_name();

        let mut registry = self.registry();
        if registry.open.contains_key(&id) || registry.tracker.count_of(id) >= self.inner.config.threshold {
            tracing::debug!(command = %name, "Breaker open, dropping failure");
            return;
        }

        if self.inner.filter.is_ignored(error) {
            let kind = error.effective_kind();
            tracing::info!(command = %name, kind = %kind, "🔌 Ignoring failure");
            metrics::record_ignored(name, kind.as_str());
            return;
        }

        let failures = registry.tracker.increment(id);
        registry.watched.entry(id).or_insert_with(|| command.clone());
        metrics::record_failure(name);
        metrics::record_tracked_commands(registry.tracker.tracked());
        tracing::debug!(
            command = %name,
            failures,
            threshold = self.inner.config.threshold,
            error = %error,
            "Failure counted"
        );

        if failures >= self.inner.config.threshold {
            self.open(&mut registry, command, failures);
        }
    }

    /// Force a command open. Returns false if it already was.
    pub fn trip(&self, command: &Arc<Command>) -> bool {
        let mut registry = self.registry();
        if registry.open.contains_key(&command.id()) {
            return false;
        }
        let failures = registry.tracker.count_of(command.id());
        registry.watched.entry(command.id()).or_insert_with(|| command.clone());
        self.open(&mut registry, command, failures);
        true
    }

    /// Close a command now, cancelling its pending reset.
    ///
    /// Also clears any failures counted while closed. Returns whether the
    /// command was open.
    pub fn reset(&self, command: &Command) -> bool {
        let mut registry = self.registry();
        let id = command.id();
        match registry.open.remove(&id) {
            Some(episode) => {
                episode.reset.cancel();
                self.close(&mut registry, episode);
                true
            }
            None => {
                registry.tracker.clear(id);
                registry.watched.remove(&id);
                metrics::record_tracked_commands(registry.tracker.tracked());
                false
            }
        }
    }

    /// Cancel every pending reset and restore every original handler.
    pub fn shutdown(&self) {
        let restored = self.registry().close_all();
        tracing::info!(restored, "Command breaker shut down");
    }

    pub fn state_of(&self, command: &Command) -> CircuitState {
        if self.registry().open.contains_key(&command.id()) {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    /// Failures counted for a command since its last reset.
    pub fn failure_count(&self, command: &Command) -> u32 {
        self.registry().tracker.count_of(command.id())
    }

    pub fn open_count(&self) -> usize {
        self.registry().open.len()
    }

    /// Commands with at least one counted failure, open ones included.
    pub fn tracked_count(&self) -> usize {
        self.registry().tracker.tracked()
    }

    /// Status of every command that is open or has counted failures.
    pub fn snapshot(&self) -> Vec<BreakerStatus> {
        let registry = self.registry();
        let reset_after = self.inner.config.reset_after();
        let now = Instant::now();

        let mut statuses: Vec<BreakerStatus> = registry
            .watched
            .values()
            .map(|command| {
                let id = command.id();
                let episode = registry.open.get(&id);
                BreakerStatus {
                    command: command.qualified_name().to_string(),
                    id: id.0,
                    state: if episode.is_some() { CircuitState::Open } else { CircuitState::Closed },
                    failures: registry.tracker.count_of(id),
                    reset_in_ms: episode.map(|e| {
                        e.tripped_at.checked_add(reset_after).map_or(u64::MAX, |due| {
                            let remaining = due.saturating_duration_since(now).as_millis();
                            u64::try_from(remaining).unwrap_or(u64::MAX)
                        })
                    }),
                }
            })
            .collect();
        statuses.sort_by_key(|s| s.id);
        statuses
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closed → Open. Caller holds the registry lock.
    fn open(&self, registry: &mut Registry, command: &Arc<Command>, failures: u32) {
        let original = command.replace_handler(self.fallback());
        let epoch = registry.next_epoch;
        registry.next_epoch += 1;

        let delay = self.inner.config.reset_after();
        let reset = self.schedule_reset(command.id(), epoch, delay);

        registry.open.insert(
            command.id(),
            OpenEpisode {
                command: command.clone(),
                original,
                tripped_at: Instant::now(),
                epoch,
                reset,
            },
        );

        tracing::warn!(
            command = %command.qualified_name(),
            failures,
            reset_after_ms = self.inner.config.reset_after_ms,
            "🔌 Breaker tripped"
        );
        metrics::record_trip(command.qualified_name());
        metrics::record_open_commands(registry.open.len());
    }

    fn schedule_reset(&self, id: CommandId, epoch: u64, delay: Duration) -> ScheduledReset {
        let weak: Weak<BreakerInner> = Arc::downgrade(&self.inner);
        self.inner.scheduler.schedule_once(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    CommandBreaker { inner }.expire(id, epoch);
                }
            }),
        )
    }

    /// Timer callback. Stale timers from an earlier episode do nothing.
    fn expire(&self, id: CommandId, epoch: u64) {
        let mut registry = self.registry();
        let current = registry.open.get(&id).map(|e| e.epoch);
        if current != Some(epoch) {
            tracing::debug!(command = %id, epoch, "Reset fired for a closed breaker, ignoring");
            return;
        }
        if let Some(episode) = registry.open.remove(&id) {
            self.close(&mut registry, episode);
        }
    }

    /// Open → Closed. The episode is already out of the open table.
    fn close(&self, registry: &mut Registry, episode: OpenEpisode) {
        registry.close(episode);
    }
}

impl Registry {
    fn close(&mut self, episode: OpenEpisode) {
        let OpenEpisode { command, original, .. } = episode;
        command.replace_handler(original);
        self.tracker.clear(command.id());
        self.watched.remove(&command.id());

        tracing::warn!(command = %command.qualified_name(), "🔌 Breaker reset");
        metrics::record_reset(command.qualified_name());
        metrics::record_open_commands(self.open.len());
        metrics::record_tracked_commands(self.tracker.tracked());
    }

    /// Cancel every pending reset and close every open command.
    fn close_all(&mut self) -> usize {
        let episodes: Vec<OpenEpisode> = self.open.drain().map(|(_, e)| e).collect();
        let restored = episodes.len();
        for episode in episodes {
            episode.reset.cancel();
            self.close(episode);
        }
        self.tracker = ErrorTracker::new();
        self.watched.clear();
        metrics::record_tracked_commands(0);
        restored
    }
}

/// Pending timers only hold a weak reference, so the last handle going away
/// must hand every slot back itself.
impl Drop for BreakerInner {
    fn drop(&mut self) {
        let registry = self.registry.get_mut().unwrap_or_else(PoisonError::into_inner);
        let restored = registry.close_all();
        if restored > 0 {
            tracing::info!(restored, "Command breaker dropped while open");
        }
    }
}

impl ErrorHook for CommandBreaker {
    fn on_command_error(&self, interaction: &Interaction, error: &CommandError) {
        self.report_failure(interaction, error);
    }
}

/// Used until a fallback is registered.
fn default_fallback() -> Handler {
    handler_fn(|interaction: Interaction| async move {
        if let Some(command) = interaction.command() {
            tracing::info!(
                command = %command.qualified_name(),
                user = interaction.user_id(),
                "Command suspended, no fallback registered"
            );
        }
        Ok(())
    })
}
