use common_utils::consts;
use interfaces::callbacks::RequestDetails;

/// Record the header's fields in request's trace
pub fn record_fields_from_header<B>(request: &http::Request<B>) -> tracing::Span {
    let url_path = request.uri().path();

    let span = tracing::debug_span!(
        "request",
        uri = %url_path,
        version = ?request.version(),
        request_id = tracing::field::Empty,
    );

    request
        .headers()
        .get(consts::X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(|request_id| span.record("request_id", request_id));

    span
}

/// Flatten an axum request's parts into the transport-neutral
/// [`RequestDetails`] the engine works on. Query parameter order is kept;
/// the generic family's signature is computed over the canonicalized query.
pub fn request_details(
    headers: &http::HeaderMap,
    raw_query: Option<&str>,
    body: &[u8],
) -> RequestDetails {
    let header_map = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_ascii_lowercase(), value.to_owned()))
        })
        .collect();

    let query_params = raw_query
        .map(|query| {
            serde_urlencoded::from_str::<Vec<(String, String)>>(query).unwrap_or_default()
        })
        .unwrap_or_default();

    RequestDetails {
        headers: header_map,
        query_params,
        body: body.to_vec(),
    }
}

/// Append a query flag to a merchant URL, tolerating URLs that already carry
/// a query string.
pub fn with_query_flag(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{key}={value}")
}

/// Minimal HTML escaping for values interpolated into the interstitial page.
pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
