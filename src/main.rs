//! Command breaker demo.
//!
//! Registers a command that always fails and one that fails at random,
//! dispatches them repeatedly and shows the breaker tripping and resetting.
//!
//! ```text
//! dispatch loop ──▶ Dispatcher ──▶ active handler (original | fallback)
//!                       │
//!                       └─ on error ──▶ CommandBreaker (ErrorHook)
//!                                           │
//!                                           ├─ count / filter
//!                                           └─ trip ──▶ reset timer
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use command_breaker::config::loader::load_config;
use command_breaker::observability::{logging, metrics};
use command_breaker::{handler_fn, AppConfig, CommandBreaker, CommandError, Dispatcher, ErrorKind};

#[derive(Parser)]
#[command(name = "command-breaker")]
#[command(about = "Circuit breaker demo for command dispatch", long_about = None)]
struct Cli {
    /// TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override breaker.threshold.
    #[arg(long)]
    threshold: Option<u32>,

    /// Override breaker.reset_after_ms.
    #[arg(long)]
    reset_after_ms: Option<u64>,

    /// Invocations per command.
    #[arg(short, long, default_value_t = 10)]
    invocations: u32,

    /// Pause between invocations.
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.breaker.threshold = threshold;
    }
    if let Some(reset_after_ms) = cli.reset_after_ms {
        config.breaker.reset_after_ms = reset_after_ms;
    }

    logging::init_logging(&config.observability)?;
    let prometheus = if config.observability.metrics_enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let dispatcher = Dispatcher::new();
    dispatcher.register(
        "test",
        handler_fn(|_| async { Err(CommandError::internal("This command always fails!")) }),
    );
    dispatcher.register(
        "weather",
        handler_fn(|_| async {
            if fastrand::u8(..4) == 0 {
                Err(CommandError::new(ErrorKind::Timeout, "forecast API timed out"))
            } else if fastrand::bool() {
                Err(CommandError::new(ErrorKind::Unavailable, "forecast API down"))
            } else {
                Ok(())
            }
        }),
    );

    let breaker = CommandBreaker::new(config.breaker.clone())?;
    breaker.on_tripped_call(handler_fn(|interaction| async move {
        // Keep this cheap: whatever tripped the breaker may still be down.
        let name = interaction
            .command()
            .map(|c| c.qualified_name().to_string())
            .unwrap_or_default();
        tracing::info!(
            command = %name,
            user = interaction.user_id(),
            "⚡ Breaker tripped! This command is temporarily disabled due to encountering too many errors."
        );
        Ok(())
    }));
    breaker.install(&dispatcher);

    let interval = Duration::from_millis(cli.interval_ms);
    for round in 0..cli.invocations {
        for name in ["test", "weather"] {
            match dispatcher.dispatch(name, u64::from(round)).await {
                Ok(()) => tracing::debug!(command = name, round, "Invocation succeeded"),
                Err(e) => tracing::debug!(command = name, round, error = %e, "Invocation failed"),
            }
        }
        tokio::time::sleep(interval).await;
    }

    println!("{}", serde_json::to_string_pretty(&breaker.snapshot())?);
    if let Some(handle) = prometheus {
        println!("{}", handle.render());
    }

    breaker.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
