//! Remote call subsystem.
//!
//! # Data Flow
//! ```text
//! catalog client
//!     → adapter.rs (deadline, outcome normalization)
//!     → pending.rs (correlation token, handler registry, cleanup guard)
//!     → transport.rs (HTTP exchange)
//! ```
//!
//! # Design Decisions
//! - Every call has a deadline; timing out is the only cancellation
//! - No retries at this layer
//! - Transport failures, timeouts and remote API errors stay distinct

pub mod adapter;
pub mod pending;
pub mod transport;

pub use adapter::RemoteCallAdapter;
pub use pending::{CorrelationToken, PendingCall, PendingRegistry};
pub use transport::{HttpTransport, Transport, TransportError};
