//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker, remote adapter and catalog client produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via the `metrics` facade)
//!
//! Consumers:
//!     → stderr (human-readable or JSON lines)
//!     → whichever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings, for everything a machine reads
//! - Correlation token flows from the adapter into every remote-call event
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
