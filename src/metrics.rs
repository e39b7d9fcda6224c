//! Crawl phase metrics
//!
//! Counters follow the naming convention `wedding_{phase}_{name}_total`.
//! Without an installed recorder every call is a no-op, so library code can
//! record unconditionally.

use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("wedding_", $phase, "_", $name, "_total")
    };
}

/// Install the Prometheus recorder.
///
/// With `WEDDING_METRICS_ADDR` set, an HTTP listener serves `/metrics` at that
/// address (requires a running tokio runtime). Otherwise the recorder is kept
/// in-process and [`render`] returns the snapshot.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();

    if let Ok(addr) = std::env::var("WEDDING_METRICS_ADDR") {
        match addr.parse::<std::net::SocketAddr>() {
            Ok(addr) => {
                match builder.with_http_listener(addr).install() {
                    Ok(()) => info!("Prometheus exporter listening at http://{}/metrics", addr),
                    Err(e) => warn!("Failed to start Prometheus exporter: {}", e),
                }
                return;
            }
            Err(_) => warn!("Invalid WEDDING_METRICS_ADDR '{}', keeping metrics in-process", addr),
        }
    }

    match builder.install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Prometheus text snapshot, when the in-process recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

pub struct ListingMetrics;

impl ListingMetrics {
    pub fn record_page_fetched() {
        ::metrics::counter!(phase_metric!(counter, "listing", "pages_fetched")).increment(1);
    }

    pub fn record_page_failed() {
        ::metrics::counter!(phase_metric!(counter, "listing", "pages_failed")).increment(1);
    }

    pub fn record_page_empty() {
        ::metrics::counter!(phase_metric!(counter, "listing", "pages_empty")).increment(1);
    }

    pub fn record_venues(new: usize, duplicates: usize) {
        ::metrics::counter!(phase_metric!(counter, "listing", "venues_discovered")).increment(new as u64);
        ::metrics::counter!(phase_metric!(counter, "listing", "duplicates_skipped"))
            .increment(duplicates as u64);
    }
}

pub struct CalendarMetrics;

impl CalendarMetrics {
    pub fn record_nonce_unresolved() {
        ::metrics::counter!(phase_metric!(counter, "calendar", "nonces_unresolved")).increment(1);
    }

    pub fn record_month_fetched(reservations: usize) {
        ::metrics::counter!(phase_metric!(counter, "calendar", "months_fetched")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "calendar", "reservations_parsed"))
            .increment(reservations as u64);
    }

    pub fn record_month_failed() {
        ::metrics::counter!(phase_metric!(counter, "calendar", "months_failed")).increment(1);
    }
}
