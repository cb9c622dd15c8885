//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! ArtistSearch::execute:
//!     → circuit_breaker.rs (gate on health, fail fast while open)
//!     → catalog two-step call (each step deadline-bounded in remote/)
//!     → circuit_breaker.rs (record outcome, trip or recover)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: the breaker only gates access
//! - Breaker rejections are distinct from operation errors

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerError, BreakerState, CircuitBreaker, CircuitOpenError};
