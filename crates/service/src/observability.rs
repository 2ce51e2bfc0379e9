use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static STORE_WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kiosk_store_writes_total",
        "Document replacements committed to disk"
    )
    .expect("register store_writes_total")
});

pub static STORE_WRITE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kiosk_store_write_failures_total",
        "Document replacements that failed during temp write or rename"
    )
    .expect("register store_write_failures_total")
});

pub static STORE_SEEDS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kiosk_store_seeds_total",
        "Default documents created because no file existed"
    )
    .expect("register store_seeds_total")
});

pub static STORE_WRITE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "kiosk_store_write_duration_seconds",
        "Time spent inside the write slot (temp write, fsync, rename)",
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("register store_write_duration")
});

pub fn encode_metrics() -> (u16, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (500, format!("metrics encode error: {e}"));
    }
    (200, String::from_utf8(buffer).unwrap_or_default())
}
