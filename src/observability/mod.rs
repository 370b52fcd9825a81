//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! breaker + dispatcher produce:
//!     → tracing events (logging.rs installs the subscriber)
//!     → counters and gauges (metrics.rs)
//! ```
//!
//! # Design Decisions
//! - Trip and reset log at WARN; ignored failures at INFO; the rest DEBUG
//! - Metrics go through the facade so hosts pick their own exporter

pub mod logging;
pub mod metrics;
