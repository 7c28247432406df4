use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;
use tracing::error;

lazy_static! {
    pub static ref RECONCILE_TOTAL_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("registry_sync_reconcile_total", "Settled bursts by final outcome"),
        &["service", "outcome"]
    )
    .expect("metric can not be created");

    pub static ref DEBOUNCED_EVENTS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "registry_sync_debounced_events_total",
            "Registry change signals buffered by the debounce engine"
        ),
        &["service"]
    )
    .expect("metric can not be created");

    pub static ref WATCH_FAILURES_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("registry_sync_watch_failures_total", "Failed registry watch calls"),
        &["service"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

static REGISTER: Once = Once::new();

/// Registers the collectors with [`REGISTRY`]. Safe to call repeatedly.
pub fn register_custom_metrics() {
    REGISTER.call_once(|| {
        let collectors: [Box<dyn prometheus::core::Collector>; 3] = [
            Box::new(RECONCILE_TOTAL_METRIC.clone()),
            Box::new(DEBOUNCED_EVENTS_METRIC.clone()),
            Box::new(WATCH_FAILURES_METRIC.clone()),
        ];
        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                error!("collector can not be registered: {}", e);
            }
        }
    });
}

/// Prometheus text exposition of every registered collector.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
