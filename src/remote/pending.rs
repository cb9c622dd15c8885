//! Pending call bookkeeping.
//!
//! # Responsibilities
//! - Mint correlation tokens unique among in-flight calls
//! - Hold the response handler registered for each token
//! - Release handler and transport task exactly once per call

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::remote::transport::TransportError;

/// What the transport hands back for a token.
pub type Outcome = Result<Value, TransportError>;

/// Identifier binding an outbound call to its response handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationToken(Uuid);

impl CorrelationToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registry of response handlers keyed by correlation token.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    handlers: DashMap<CorrelationToken, oneshot::Sender<Outcome>>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a fresh token.
    ///
    /// A token already held by an in-flight call is never reused.
    pub fn register(&self) -> (CorrelationToken, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        loop {
            let token = CorrelationToken::new();
            if let Entry::Vacant(slot) = self.handlers.entry(token) {
                slot.insert(tx);
                return (token, rx);
            }
        }
    }

    /// Deliver an outcome to the handler for `token`.
    ///
    /// Returns false when the call was already retired; the outcome is dropped.
    pub fn complete(&self, token: CorrelationToken, outcome: Outcome) -> bool {
        match self.handlers.remove(&token) {
            Some((_, tx)) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Remove the handler for `token`. Returns false if it was already gone.
    pub fn deregister(&self, token: CorrelationToken) -> bool {
        self.handlers.remove(&token).is_some()
    }

    pub fn contains(&self, token: CorrelationToken) -> bool {
        self.handlers.contains_key(&token)
    }

    /// Number of calls still awaiting a response.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// One in-flight remote exchange.
///
/// Dropping the guard retires the call: the handler is deregistered and the
/// transport task aborted. `release` does the same eagerly and is idempotent.
#[derive(Debug)]
pub struct PendingCall {
    token: CorrelationToken,
    deadline: Instant,
    registry: Arc<PendingRegistry>,
    task: Option<AbortHandle>,
    released: bool,
}

impl PendingCall {
    /// Register a new call whose deadline starts now.
    pub fn issue(
        registry: &Arc<PendingRegistry>,
        timeout: Duration,
    ) -> (Self, oneshot::Receiver<Outcome>) {
        let (token, rx) = registry.register();
        let call = Self {
            token,
            deadline: Instant::now() + timeout,
            registry: Arc::clone(registry),
            task: None,
            released: false,
        };
        (call, rx)
    }

    pub fn token(&self) -> CorrelationToken {
        self.token
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Tie the transport task to this call so release can cancel it.
    pub fn attach(&mut self, task: AbortHandle) {
        self.task = Some(task);
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Retire the call. Returns true only for the first release.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        let had_handler = self.registry.deregister(self.token);
        if let Some(task) = self.task.take() {
            task.abort();
        }

        tracing::trace!(token = %self.token, had_handler, "Pending call released");
        true
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.release();
    }
}
