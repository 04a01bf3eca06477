use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static DESCRIPTORS_BUILT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ill_availability_descriptors_built_total",
        "Total service descriptors returned to callers"
    )
    .expect("register descriptors_built_total")
});

pub static NOT_SERVICEABLE_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ill_availability_not_serviceable_total",
        "Total requests answered with not serviceable"
    )
    .expect("register not_serviceable_total")
});

pub static CONFIG_RELOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ill_availability_config_reloads_total",
        "Total configuration snapshots swapped in"
    )
    .expect("register config_reloads_total")
});

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics are not utf-8: {e}"))
}
