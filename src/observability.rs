use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservations successfully created.
pub const RESERVATIONS_TOTAL: &str = "funduq_reservations_total";

/// Counter: reserve/revise attempts rejected for an overlapping stay.
pub const RESERVATION_CONFLICTS_TOTAL: &str = "funduq_reservation_conflicts_total";

/// Counter: availability queries served.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "funduq_availability_queries_total";

/// Counter: status transitions applied.
pub const STATUS_TRANSITIONS_TOTAL: &str = "funduq_status_transitions_total";

/// Counter: confirmation notifications that failed and were swallowed.
pub const NOTIFY_FAILURES_TOTAL: &str = "funduq_notify_failures_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: live entries in the revocation store.
pub const REVOKED_TOKENS_ACTIVE: &str = "funduq_revoked_tokens_active";

/// Histogram: journal group-commit flush duration in seconds.
pub const JOURNAL_FLUSH_DURATION_SECONDS: &str = "funduq_journal_flush_duration_seconds";

/// Histogram: journal group-commit batch size (events per flush).
pub const JOURNAL_FLUSH_BATCH_SIZE: &str = "funduq_journal_flush_batch_size";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
