//! Circuit breaker for catalog protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: service assumed down, calls fail fast
//! - Half-Open: a single trial call tests whether the service recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: first call after next_attempt_at
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails (cooldown restarts)
//! ```
//!
//! # Design Decisions
//! - One breaker per wrapped operation, owned by its caller (no globals)
//! - Fail fast in Open state (the operation is never invoked)
//! - `execute` takes `&mut self`: a breaker serves one caller at a time and
//!   holds its state without locking. Share it behind a `Mutex` if needed.
//! - Time comes from `tokio::time::Instant` so tests can pause the clock

use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Breaker health state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The call was rejected because the circuit is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("circuit open, next attempt in {remaining_secs}s")]
pub struct CircuitOpenError {
    /// Remaining cooldown, rounded up to whole seconds.
    pub remaining_secs: u64,
}

/// Outcome of a guarded call that did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakerError<E> {
    /// Short-circuited; the operation was not invoked.
    #[error(transparent)]
    Open(CircuitOpenError),

    /// The operation ran and failed.
    #[error("{0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::Open(_) => None,
        }
    }
}

/// Wraps an async operation `op(args)` and gates access to it.
pub struct CircuitBreaker<F> {
    name: String,
    op: F,
    failure_threshold: u32,
    recovery_timeout: Duration,
    state: BreakerState,
    failure_count: u32,
    next_attempt_at: Option<Instant>,
}

impl<F> CircuitBreaker<F> {
    /// Create a breaker around `op`. Starts closed.
    pub fn new(name: impl Into<String>, config: &BreakerConfig, op: F) -> Self {
        Self {
            name: name.into(),
            op,
            failure_threshold: config.failure_threshold.max(1),
            recovery_timeout: config.recovery_timeout(),
            state: BreakerState::Closed,
            failure_count: 0,
            next_attempt_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Moment after which a trial call is permitted. Set while open.
    pub fn next_attempt_at(&self) -> Option<Instant> {
        self.next_attempt_at
    }

    /// Run `op(args)` through the state machine.
    pub async fn execute<A, T, E, Fut>(&mut self, args: A) -> Result<T, BreakerError<E>>
    where
        F: FnMut(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if self.state == BreakerState::Open {
            let now = Instant::now();
            match self.next_attempt_at {
                Some(next) if now <= next => {
                    let remaining = next - now;
                    tracing::warn!(
                        breaker = %self.name,
                        remaining_ms = remaining.as_millis() as u64,
                        "Circuit open, rejecting call"
                    );
                    metrics::record_breaker_rejection(&self.name);
                    return Err(BreakerError::Open(CircuitOpenError {
                        remaining_secs: ceil_secs(remaining),
                    }));
                }
                _ => self.transition(BreakerState::HalfOpen),
            }
        }

        match (self.op)(args).await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(e) => {
                self.on_failure(&e);
                Err(BreakerError::Operation(e))
            }
        }
    }

    fn on_success(&mut self) {
        self.failure_count = 0;
        if self.state == BreakerState::HalfOpen {
            self.next_attempt_at = None;
            self.transition(BreakerState::Closed);
        }
    }

    fn on_failure(&mut self, error: &impl fmt::Display) {
        metrics::record_breaker_failure(&self.name);

        match self.state {
            BreakerState::HalfOpen => {
                tracing::warn!(breaker = %self.name, error = %error, "Trial call failed");
                self.trip();
            }
            _ => {
                self.failure_count += 1;
                tracing::warn!(
                    breaker = %self.name,
                    error = %error,
                    failures = self.failure_count,
                    threshold = self.failure_threshold,
                    "Guarded call failed"
                );
                if self.failure_count >= self.failure_threshold {
                    self.trip();
                }
            }
        }
    }

    fn trip(&mut self) {
        self.next_attempt_at = Some(Instant::now() + self.recovery_timeout);
        self.transition(BreakerState::Open);
    }

    fn transition(&mut self, to: BreakerState) {
        let from = self.state;
        self.state = to;
        tracing::info!(
            breaker = %self.name,
            from = %from,
            to = %to,
            failures = self.failure_count,
            "Circuit state changed"
        );
        metrics::record_breaker_transition(&self.name, from, to);
    }
}

impl<F> fmt::Debug for CircuitBreaker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("failure_count", &self.failure_count)
            .field("failure_threshold", &self.failure_threshold)
            .field("recovery_timeout", &self.recovery_timeout)
            .finish()
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn config(threshold: u32, cooldown_ms: u64) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: threshold,
            recovery_timeout_ms: cooldown_ms,
        }
    }

    /// Breaker around a stub whose outcome is chosen per call.
    fn stub(
        threshold: u32,
        cooldown_ms: u64,
    ) -> (
        CircuitBreaker<impl FnMut(bool) -> std::future::Ready<Result<u32, String>>>,
        Arc<AtomicU32>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let breaker = CircuitBreaker::new("test", &config(threshold, cooldown_ms), move |fail: bool| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if fail { Err(format!("boom #{}", n)) } else { Ok(n) })
        });
        (breaker, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_after_threshold_failures() {
        let (mut cb, calls) = stub(3, 10_000);

        for i in 1..=2 {
            assert!(matches!(cb.execute(true).await, Err(BreakerError::Operation(_))));
            assert_eq!(cb.state(), BreakerState::Closed);
            assert_eq!(cb.failure_count(), i);
        }

        assert!(matches!(cb.execute(true).await, Err(BreakerError::Operation(_))));
        assert_eq!(cb.state(), BreakerState::Open);
        assert!(cb.next_attempt_at().is_some());

        // Fourth call within the cooldown is rejected without invoking the op.
        let err = cb.execute(false).await.unwrap_err();
        assert_eq!(err, BreakerError::Open(CircuitOpenError { remaining_secs: 10 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_never_invokes_operation() {
        let (mut cb, calls) = stub(1, 10_000);
        let _ = cb.execute(true).await;
        assert_eq!(cb.state(), BreakerState::Open);

        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(1)).await;
            assert!(matches!(cb.execute(false).await, Err(BreakerError::Open(_))));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_seconds_counts_down() {
        let (mut cb, _) = stub(1, 10_000);
        let _ = cb.execute(true).await;

        tokio::time::advance(Duration::from_millis(2500)).await;
        match cb.execute(false).await {
            Err(BreakerError::Open(e)) => assert_eq!(e.remaining_secs, 8),
            other => panic!("expected open, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_boundary_still_rejects() {
        let (mut cb, calls) = stub(1, 10_000);
        let _ = cb.execute(true).await;

        // now == next_attempt_at is still within the cooldown.
        tokio::time::advance(Duration::from_millis(10_000)).await;
        match cb.execute(false).await {
            Err(BreakerError::Open(e)) => assert_eq!(e.remaining_secs, 0),
            other => panic!("expected open, got {:?}", other.map(|_| ())),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_success_closes() {
        let (mut cb, calls) = stub(3, 10_000);
        for _ in 0..3 {
            let _ = cb.execute(true).await;
        }
        assert_eq!(cb.state(), BreakerState::Open);

        tokio::time::advance(Duration::from_millis(10_001)).await;
        assert_eq!(cb.execute(false).await.unwrap(), 4);
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert!(cb.next_attempt_at().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_failure_reopens_with_fresh_cooldown() {
        let (mut cb, calls) = stub(3, 10_000);
        for _ in 0..3 {
            let _ = cb.execute(true).await;
        }
        let first_deadline = cb.next_attempt_at().unwrap();

        tokio::time::advance(Duration::from_millis(10_001)).await;
        assert!(matches!(cb.execute(true).await, Err(BreakerError::Operation(_))));
        assert_eq!(cb.state(), BreakerState::Open);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let second_deadline = cb.next_attempt_at().unwrap();
        assert!(second_deadline > first_deadline);
        assert_eq!(second_deadline - Instant::now(), Duration::from_millis(10_000));

        // Single failure in half-open is enough; the cooldown restarted.
        match cb.execute(false).await {
            Err(BreakerError::Open(e)) => assert_eq!(e.remaining_secs, 10),
            other => panic!("expected open, got {:?}", other.map(|_| ())),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_partial_failures() {
        let (mut cb, _) = stub(3, 10_000);
        let _ = cb.execute(true).await;
        let _ = cb.execute(true).await;
        assert_eq!(cb.failure_count(), 2);

        assert!(cb.execute(false).await.is_ok());
        assert_eq!(cb.failure_count(), 0);

        // Two more failures are not enough to trip after the reset.
        let _ = cb.execute(true).await;
        let _ = cb.execute(true).await;
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_instances() {
        let (mut a, _) = stub(1, 10_000);
        let (mut b, _) = stub(1, 10_000);

        let _ = a.execute(true).await;
        assert_eq!(a.state(), BreakerState::Open);
        assert_eq!(b.state(), BreakerState::Closed);
        assert!(b.execute(false).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_operation_with_args() {
        let mut cb = CircuitBreaker::new("async", &config(2, 1_000), |name: String| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if name.is_empty() {
                Err("empty")
            } else {
                Ok(name.len())
            }
        });

        assert_eq!(cb.execute("daft punk".to_string()).await.unwrap(), 9);
        assert_eq!(
            cb.execute(String::new()).await.unwrap_err().into_operation(),
            Some("empty")
        );
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::ZERO), 0);
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::from_millis(9_999)), 10);
        assert_eq!(ceil_secs(Duration::from_secs(10)), 10);
    }
}
