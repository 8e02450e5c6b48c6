pub mod health_check;
pub mod hpp;
pub mod redirect;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reconciliation::CallbackOutcome;

use crate::metrics;

/// The HTTP response contract: 200 for accepted or deliberately-ignored
/// notifications, 403 for signature failures, 404 for unknown orders, 400
/// for undecodable payloads.
pub(crate) fn outcome_response(endpoint: &'static str, outcome: &CallbackOutcome) -> Response {
    match outcome {
        CallbackOutcome::Accepted { .. } | CallbackOutcome::IgnoredMismatch { .. } => {
            (StatusCode::OK, "OK").into_response()
        }
        CallbackOutcome::AuthenticationFailed => {
            metrics::CALLBACKS_REJECTED
                .with_label_values(&[endpoint, "signature"])
                .inc();
            (StatusCode::FORBIDDEN, "signature verification failed").into_response()
        }
        CallbackOutcome::Malformed => {
            metrics::CALLBACKS_REJECTED
                .with_label_values(&[endpoint, "malformed"])
                .inc();
            (StatusCode::BAD_REQUEST, "malformed payload").into_response()
        }
        CallbackOutcome::OrderNotFound => {
            metrics::CALLBACKS_REJECTED
                .with_label_values(&[endpoint, "order_not_found"])
                .inc();
            (StatusCode::NOT_FOUND, "order not found").into_response()
        }
        CallbackOutcome::Unavailable => {
            metrics::CALLBACKS_REJECTED
                .with_label_values(&[endpoint, "unavailable"])
                .inc();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "temporary processing failure",
            )
                .into_response()
        }
    }
}
