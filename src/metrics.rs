// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the kubevirt-dns controller.
//!
//! All metrics use the namespace prefix `kubevirt_dns_` and are registered in
//! [`METRICS_REGISTRY`], which the `/metrics` endpoint encodes.
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Outcomes and duration of reconciliation passes
//! - **DNSEndpoint Metrics** - Writes issued against `DNSEndpoint` objects
//! - **Address Metrics** - Which address source won, and why passes were skipped
//! - **Leader Election Metrics** - Leadership state changes
//!
//! # Example
//!
//! ```rust,no_run
//! use kubevirt_dns::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("created", std::time::Duration::from_millis(12));
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
    TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "kubevirt_dns";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by status and outcome
///
/// Labels:
/// - `status`: `success` or `error`
/// - `outcome`: reconcile outcome label, or the error category on failure
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of VMI reconciliations by status and outcome",
    );
    let counter = CounterVec::new(opts, &["status", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `status`: `success` or `error`
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of VMI reconciliations in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// DNSEndpoint Metrics
// ============================================================================

/// `DNSEndpoint` operations by kind
///
/// Labels:
/// - `operation`: `created`, `updated`, `unchanged`, `deleted`
pub static DNS_ENDPOINT_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_dnsendpoint_operations_total"),
        "Total number of DNSEndpoint operations by kind",
    );
    let counter = CounterVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Address Metrics
// ============================================================================

/// Address source selected per published reconciliation
///
/// Labels:
/// - `source`: `guest-agent` or `multus-status`
pub static ADDRESS_SOURCE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_address_source_total"),
        "Total number of reconciliations by winning address source",
    );
    let counter = CounterVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Reconciliations that intentionally wrote nothing
///
/// Labels:
/// - `reason`: e.g. `no_addresses`
pub static SKIPPED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_skipped_total"),
        "Total number of reconciliations skipped by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// VMI watch events dropped by the change filter
pub static EVENTS_FILTERED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_events_filtered_total"),
        "Total number of VMI update events without hostname or interface changes",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Leader Election Metrics
// ============================================================================

/// Total number of leader election events
///
/// Labels:
/// - `status`: `acquired` or `lost`
pub static LEADER_ELECTIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_leader_elections_total"),
        "Total number of leader election events by status",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Current leader election status (1 = leader, 0 = follower)
pub static LEADER_STATUS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_leader_status"),
        "Current leader election status (1 = leader, 0 = follower)",
    );
    let gauge = GaugeVec::new(opts, &["pod_name"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
pub fn record_reconciliation_success(outcome: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&["success", outcome])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&["success"])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
///
/// # Arguments
/// * `category` - Error category (see `ReconcileError::category`)
/// * `duration` - Duration of the reconciliation before failure
pub fn record_reconciliation_error(category: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&["error", category])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&["error"])
        .observe(duration.as_secs_f64());
}

pub fn record_dns_endpoint_operation(operation: &str) {
    DNS_ENDPOINT_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

pub fn record_address_source(source: &str) {
    ADDRESS_SOURCE_TOTAL.with_label_values(&[source]).inc();
}

pub fn record_skip(reason: &str) {
    SKIPPED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_event_filtered() {
    EVENTS_FILTERED_TOTAL.inc();
}

/// Record leader election acquired
pub fn record_leader_elected(pod_name: &str) {
    LEADER_ELECTIONS_TOTAL
        .with_label_values(&["acquired"])
        .inc();
    LEADER_STATUS.with_label_values(&[pod_name]).set(1.0);
}

/// Record leader election lost
pub fn record_leader_lost(pod_name: &str) {
    LEADER_ELECTIONS_TOTAL.with_label_values(&["lost"]).inc();
    LEADER_STATUS.with_label_values(&[pod_name]).set(0.0);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reconciliation_success() {
        record_reconciliation_success("test_outcome", Duration::from_millis(500));

        let counter = RECONCILIATION_TOTAL.with_label_values(&["success", "test_outcome"]);
        assert!(counter.get() > 0.0);

        let histogram = RECONCILIATION_DURATION_SECONDS.with_label_values(&["success"]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_reconciliation_error() {
        record_reconciliation_error("test_category", Duration::from_millis(250));

        let counter = RECONCILIATION_TOTAL.with_label_values(&["error", "test_category"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_record_dns_endpoint_operation() {
        let before = DNS_ENDPOINT_OPERATIONS_TOTAL
            .with_label_values(&["test_op"])
            .get();
        record_dns_endpoint_operation("test_op");
        let after = DNS_ENDPOINT_OPERATIONS_TOTAL
            .with_label_values(&["test_op"])
            .get();
        assert!(after > before);
    }

    #[test]
    fn test_leader_status_gauge() {
        record_leader_elected("test-pod");
        assert!(
            (LEADER_STATUS.with_label_values(&["test-pod"]).get() - 1.0).abs() < f64::EPSILON
        );
        record_leader_lost("test-pod");
        assert!(LEADER_STATUS.with_label_values(&["test-pod"]).get().abs() < f64::EPSILON);
    }

    #[test]
    fn test_gather_metrics() {
        record_reconciliation_success("gather_test", Duration::from_millis(100));
        record_event_filtered();

        let metrics_text = gather_metrics().expect("Gathering metrics should succeed");
        assert!(
            metrics_text.contains("kubevirt_dns_reconciliations_total"),
            "Metrics should contain reconciliation counter"
        );
        assert!(metrics_text.contains("kubevirt_dns_events_filtered_total"));
    }
}
