use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static STORAGE_FAULTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "relief_storage_faults_total",
        "Storage faults absorbed by the request store, by operation",
        &["op"]
    )
    .expect("register storage_faults_total")
});

pub static REQUESTS_SAVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "relief_requests_saved_total",
        "Supply requests written to storage, by initial status",
        &["status"]
    )
    .expect("register requests_saved_total")
});

pub fn record_storage_fault(op: &str) {
    STORAGE_FAULTS_TOTAL.with_label_values(&[op]).inc();
}

pub fn record_request_saved(status: &str) {
    REQUESTS_SAVED_TOTAL.with_label_values(&[status]).inc();
}

/// Encode the default registry in the prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_counter_shows_up_in_exposition() -> Result<(), prometheus::Error> {
        record_storage_fault("get_user_info");
        let before = STORAGE_FAULTS_TOTAL.with_label_values(&["get_user_info"]).get();
        record_storage_fault("get_user_info");
        assert_eq!(STORAGE_FAULTS_TOTAL.with_label_values(&["get_user_info"]).get(), before + 1);
        let text = encode_metrics()?;
        assert!(text.contains("relief_storage_faults_total"));
        Ok(())
    }
}
