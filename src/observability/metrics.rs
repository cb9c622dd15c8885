//! Metrics collection.
//!
//! # Metrics
//! - `breaker_transitions_total` (counter): state changes by breaker, from, to
//! - `breaker_rejections_total` (counter): calls short-circuited while open
//! - `breaker_failures_total` (counter): failed operations observed by a breaker
//! - `remote_calls_total` (counter): retired remote calls by outcome
//! - `remote_late_responses_total` (counter): responses that arrived after retirement

use crate::resilience::circuit_breaker::BreakerState;

pub fn record_breaker_transition(breaker: &str, from: BreakerState, to: BreakerState) {
    metrics::counter!(
        "breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

pub fn record_breaker_rejection(breaker: &str) {
    metrics::counter!("breaker_rejections_total", "breaker" => breaker.to_string()).increment(1);
}

pub fn record_breaker_failure(breaker: &str) {
    metrics::counter!("breaker_failures_total", "breaker" => breaker.to_string()).increment(1);
}

/// `outcome` is one of "ok", "remote_api", "connection", "timeout".
pub fn record_remote_call(outcome: &'static str) {
    metrics::counter!("remote_calls_total", "outcome" => outcome).increment(1);
}

pub fn record_late_response() {
    metrics::counter!("remote_late_responses_total").increment(1);
}
