//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → Log output (stderr, filtered by RUST_LOG)
//!     → Whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (`model = %key`) rather than formatted strings
//! - The core installs no metrics exporter; without a recorder updates are no-ops

pub mod logging;
pub mod metrics;
