use error_stack::ResultExt;
use lazy_static::lazy_static;
use prometheus::{
    self, register_int_counter_vec, Encoder, IntCounterVec, TextEncoder,
};

lazy_static! {
    #[allow(clippy::expect_used)]
    pub static ref CALLBACKS_RECEIVED: IntCounterVec = register_int_counter_vec!(
        "callbacks_received_total",
        "Total callback requests received, by endpoint",
        &["endpoint"]
    )
    .expect("failed to register callbacks_received_total");

    #[allow(clippy::expect_used)]
    pub static ref CALLBACKS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "callbacks_rejected_total",
        "Callback requests rejected before reaching the order, by failure class",
        &["endpoint", "reason"]
    )
    .expect("failed to register callbacks_rejected_total");
}

pub async fn metrics_handler() -> error_stack::Result<String, MetricsError> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .change_context(MetricsError::EncodingError)?;
    String::from_utf8(buffer).change_context(MetricsError::Utf8Error)
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Error encoding metrics")]
    EncodingError,
    #[error("Error converting metrics to utf8")]
    Utf8Error,
}
