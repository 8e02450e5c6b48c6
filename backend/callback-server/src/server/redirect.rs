//! Generic asynchronous-method callback family (bank redirect, BNPL).
//!
//! The customer-facing `return` never trusts its own payload: it verifies
//! the signed query, then re-queries the processor by transaction id and
//! reconciles against that. The server-to-server `status` webhook is
//! authoritative and state-changing, unlike its hosted-page counterpart.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use common_utils::consts;
use domain_types::order::OrderId;
use reconciliation::{families::redirect::RedirectNotificationSource, CallbackOutcome};

use crate::{metrics, server::outcome_response, state::AppState, utils};

pub async fn redirect_return(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    metrics::CALLBACKS_RECEIVED
        .with_label_values(&["redirect_return"])
        .inc();

    let request = utils::request_details(&headers, query.as_deref(), &body);
    let outcome = state
        .engine
        .reconcile_by_query(&RedirectNotificationSource, &request)
        .await;

    match outcome {
        CallbackOutcome::Accepted { status, .. } if status.is_paid() => Redirect::to(
            &state.gateway.order_received_url,
        )
        .into_response(),
        CallbackOutcome::Accepted { .. } | CallbackOutcome::Unavailable => {
            Redirect::to(&state.gateway.checkout_url).into_response()
        }
        CallbackOutcome::AuthenticationFailed => {
            metrics::CALLBACKS_REJECTED
                .with_label_values(&["redirect_return", "signature"])
                .inc();
            (StatusCode::FORBIDDEN, "signature verification failed").into_response()
        }
        other => outcome_response("redirect_return", &other),
    }
}

pub async fn redirect_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    metrics::CALLBACKS_RECEIVED
        .with_label_values(&["redirect_status"])
        .inc();

    let request = utils::request_details(&headers, query.as_deref(), &body);
    let outcome = state
        .engine
        .process_notification(&RedirectNotificationSource, &request)
        .await;

    outcome_response("redirect_status", &outcome)
}

pub async fn redirect_cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    metrics::CALLBACKS_RECEIVED
        .with_label_values(&["redirect_cancel"])
        .inc();

    let request = utils::request_details(&headers, query.as_deref(), &body);
    let order_id = request
        .query_value(consts::ORDER_ID_PARAM)
        .and_then(|value| value.parse::<OrderId>().ok());

    // customer aborts are unauthenticated; the engine only ever cancels
    // orders still awaiting payment, so a replayed cancel cannot undo a
    // settled order
    let outcome = state.engine.cancel_order(order_id).await;
    if let CallbackOutcome::Unavailable = outcome {
        tracing::warn!("order cancellation could not be recorded, redirecting anyway");
    }

    Redirect::to(&utils::with_query_flag(
        &state.gateway.checkout_url,
        consts::CANCELLED_MARKER_PARAM,
        "1",
    ))
    .into_response()
}
