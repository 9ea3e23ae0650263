use std::net::SocketAddr;

// ── Booking path ────────────────────────────────────────────────

/// Counter: bookings committed through the write gateway.
pub const BOOKINGS_CREATED_TOTAL: &str = "roomkit_bookings_created_total";

/// Counter: create/update attempts denied by the overlap scan.
pub const BOOKING_CONFLICTS_TOTAL: &str = "roomkit_booking_conflicts_total";

/// Histogram: booking commit latency in seconds.
pub const BOOKING_COMMIT_DURATION_SECONDS: &str = "roomkit_booking_commit_duration_seconds";

// ── Circuit breaker ─────────────────────────────────────────────

/// Counter: breaker trips (closed/half-open → open transitions).
pub const BREAKER_TRIPS_TOTAL: &str = "roomkit_breaker_trips_total";

/// Counter: calls rejected while the breaker was open or probing.
pub const BREAKER_REJECTED_TOTAL: &str = "roomkit_breaker_rejected_total";

// ── Authorization ───────────────────────────────────────────────

/// Counter: operations denied by the role policy.
pub const AUTH_DENIALS_TOTAL: &str = "roomkit_auth_denials_total";

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
