//! Remote call adapter.
//!
//! # Responsibilities
//! - Issue one outbound call per invocation, tagged with a correlation token
//! - Enforce the deadline
//! - Normalize every outcome into `SearchError`
//! - Retire the call exactly once on every exit path
//!
//! # Call lifecycle
//! ```text
//! invoke(url)
//!     → PendingCall::issue (token + handler registered, deadline armed)
//!     → spawn transport task (delivers through the registry)
//!     → first of {response, transport error, deadline}
//!     → PendingCall::release (handler removed, task aborted)
//! ```
//! A response that reaches the registry after release finds no handler and
//! is dropped.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{SearchError, SearchResult};
use crate::observability::metrics;
use crate::remote::pending::{PendingCall, PendingRegistry};
use crate::remote::transport::Transport;

/// Performs deadline-bounded exchanges over a transport.
pub struct RemoteCallAdapter<T> {
    transport: Arc<T>,
    registry: Arc<PendingRegistry>,
    timeout: Duration,
}

impl<T> Clone for RemoteCallAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            registry: Arc::clone(&self.registry),
            timeout: self.timeout,
        }
    }
}

impl<T: Transport> RemoteCallAdapter<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self {
            transport: Arc::new(transport),
            registry: Arc::new(PendingRegistry::new()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Calls currently awaiting a response.
    pub fn pending(&self) -> usize {
        self.registry.len()
    }

    /// Fetch `endpoint` and return its JSON payload.
    pub async fn invoke(&self, endpoint: Url) -> SearchResult<Value> {
        let (mut call, rx) = PendingCall::issue(&self.registry, self.timeout);
        let token = call.token();

        tracing::debug!(
            token = %token,
            endpoint = %endpoint,
            timeout_ms = self.timeout.as_millis() as u64,
            "Remote call issued"
        );

        let transport = Arc::clone(&self.transport);
        let registry = Arc::clone(&self.registry);
        let task = tokio::spawn(async move {
            let outcome = transport.fetch(endpoint, token).await;
            if !registry.complete(token, outcome) {
                tracing::debug!(token = %token, "Late response ignored");
                metrics::record_late_response();
            }
        });
        call.attach(task.abort_handle());

        let received = tokio::time::timeout_at(call.deadline(), rx).await;
        call.release();

        let result = match received {
            Ok(Ok(Ok(payload))) => check_payload(payload),
            Ok(Ok(Err(e))) => Err(SearchError::Connection(e.to_string())),
            Ok(Err(_)) => Err(SearchError::Connection(
                "transport ended without a response".to_string(),
            )),
            Err(_) => Err(SearchError::Timeout(self.timeout)),
        };

        match &result {
            Ok(_) => {
                tracing::debug!(token = %token, "Remote call completed");
                metrics::record_remote_call("ok");
            }
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "Remote call failed");
                metrics::record_remote_call(e.kind());
            }
        }

        result
    }
}

/// Reject payloads that carry an application-level `error` object.
pub fn check_payload(payload: Value) -> SearchResult<Value> {
    let error = match payload.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(payload),
        Some(error) => error,
    };

    let message = match error {
        Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown remote error")
            .to_string(),
    };
    let code = error.get("code").and_then(Value::as_i64);

    Err(SearchError::RemoteApi { message, code })
}
