//! Metrics collection and exposition.
//!
//! # Metrics
//! - `attestor_attestations_total` (counter): submissions by outcome
//! - `attestor_submit_duration_seconds` (histogram): end-to-end latency
//! - `attestor_rpc_failovers_total` (counter): provider failovers by op
//! - `attestor_rpc_healthy` (gauge): 1 when the RPC endpoint answers

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one attestation submission and its latency.
pub fn record_attestation(outcome: &'static str, start: Instant) {
    counter!("attestor_attestations_total", "outcome" => outcome).increment(1);
    histogram!("attestor_submit_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a provider failover during an RPC operation.
pub fn record_rpc_failover(op: &'static str) {
    counter!("attestor_rpc_failovers_total", "op" => op).increment(1);
}

/// Record RPC endpoint health.
pub fn record_rpc_health(healthy: bool) {
    gauge!("attestor_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
