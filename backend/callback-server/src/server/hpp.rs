//! Hosted-payment-page callback family.
//!
//! The processor pushes a signed JSON blob through the customer's browser:
//! `return` renders an interstitial page that re-posts the verbatim payload
//! and signature to `final`, which is the only state-changing step. The
//! interstitial validates the signature for display purposes only; `final`
//! never trusts it and verifies again from scratch.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use common_utils::consts;
use gateway_integration::globalpay;
use interfaces::callbacks::NotificationSource;
use reconciliation::families::hpp::{HppFinalSource, HppNotificationSource};

use crate::{metrics, server::outcome_response, state::AppState, utils};

/// Seconds the interstitial page waits before auto-submitting to `final`.
const INTERSTITIAL_COUNTDOWN_SECS: u8 = 5;

pub async fn hpp_return(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    metrics::CALLBACKS_RECEIVED
        .with_label_values(&["hpp_return"])
        .inc();

    let request = utils::request_details(&headers, query.as_deref(), &body);
    let source = HppNotificationSource;

    if !matches!(
        source.verify_source(&request, state.engine.merchant_config()),
        Ok(true)
    ) {
        metrics::CALLBACKS_REJECTED
            .with_label_values(&["hpp_return", "signature"])
            .inc();
        return (StatusCode::FORBIDDEN, "signature verification failed").into_response();
    }

    let notification = match source.parse_notification(&request) {
        Ok(notification) => notification,
        Err(error) => {
            tracing::warn!(?error, "undecodable hosted-page return payload");
            return (StatusCode::BAD_REQUEST, "malformed payload").into_response();
        }
    };

    // the body verified as a signature over UTF-8 text, so this cannot fail
    // for a payload that passed the check above
    let raw_body = match String::from_utf8(body.to_vec()) {
        Ok(raw_body) => raw_body,
        Err(_) => return (StatusCode::BAD_REQUEST, "malformed payload").into_response(),
    };
    let signature = request
        .header(consts::X_GP_SIGNATURE)
        .unwrap_or("")
        .to_owned();

    let approved = globalpay::is_approved_capture(&notification);
    let final_url = format!(
        "{}/callback/globalpay_hpp_final",
        state.gateway.callback_base_url.trim_end_matches('/')
    );

    Html(interstitial_page(
        &final_url, &raw_body, &signature, approved,
    ))
    .into_response()
}

/// The hosted-page webhook is an acknowledgment only; authoritative data for
/// this family arrives via `final`. Kept deliberately distinct from the
/// generic family's authoritative `status` webhook.
pub async fn hpp_status() -> Response {
    metrics::CALLBACKS_RECEIVED
        .with_label_values(&["hpp_status"])
        .inc();
    (StatusCode::OK, "OK").into_response()
}

pub async fn hpp_cancel(State(state): State<AppState>) -> Response {
    metrics::CALLBACKS_RECEIVED
        .with_label_values(&["hpp_cancel"])
        .inc();

    Redirect::to(&utils::with_query_flag(
        &state.gateway.checkout_url,
        consts::CANCELLED_MARKER_PARAM,
        "1",
    ))
    .into_response()
}

pub async fn hpp_final(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    metrics::CALLBACKS_RECEIVED
        .with_label_values(&["hpp_final"])
        .inc();

    let request = utils::request_details(&headers, query.as_deref(), &body);
    let outcome = state
        .engine
        .process_notification(&HppFinalSource, &request)
        .await;

    outcome_response("hpp_final", &outcome)
}

fn interstitial_page(final_url: &str, raw_body: &str, signature: &str, approved: bool) -> String {
    let message = if approved {
        "Your payment was approved. Finalizing your order…"
    } else {
        "Your payment could not be completed. Returning you to the store…"
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Processing payment</title>
</head>
<body>
<p>{message}</p>
<p>You will be redirected in <span id="countdown">{countdown}</span> seconds.</p>
<form id="gateway-final" method="post" action="{action}">
<input type="hidden" name="{signature_field}" value="{signature}">
<input type="hidden" name="{response_field}" value="{payload}">
</form>
<script>
var remaining = {countdown};
var timer = setInterval(function () {{
    remaining -= 1;
    document.getElementById("countdown").textContent = remaining;
    if (remaining <= 0) {{
        clearInterval(timer);
        document.getElementById("gateway-final").submit();
    }}
}}, 1000);
</script>
</body>
</html>
"#,
        message = message,
        countdown = INTERSTITIAL_COUNTDOWN_SECS,
        action = utils::html_escape(final_url),
        signature_field = "X-GP-Signature",
        signature = utils::html_escape(signature),
        response_field = consts::GATEWAY_RESPONSE_FIELD,
        payload = utils::html_escape(raw_body),
    )
}
