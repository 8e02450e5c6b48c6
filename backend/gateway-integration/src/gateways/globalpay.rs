pub mod client;
pub mod transformers;

use common_enums::TransactionStatus;
use common_utils::{
    consts,
    crypto::{self, GenerateDigest, VerifySignature},
    CustomResult,
};
use domain_types::{
    errors::CallbackError, merchant_config::MerchantConfig, notification::TransactionNotification,
    order::Order,
};
use error_stack::ResultExt;
use secrecy::ExposeSecret;

pub(crate) mod headers {
    pub(crate) const CONTENT_TYPE: &str = "Content-Type";
    pub(crate) const AUTHORIZATION: &str = "Authorization";
    pub(crate) const X_GP_VERSION: &str = "X-GP-Version";
}

/// API version pinned on every outbound request.
pub const GP_API_VERSION: &str = "2021-03-22";

/// Payment-method result code for a clean approval.
pub const APPROVED_RESULT_CODE: &str = "00";
/// Gateway response code signalling a partial approval; the engine voids
/// these proactively instead of settling a partial amount.
pub const PARTIAL_APPROVAL_RESPONSE_CODE: &str = "10";
/// Action wrapper result required by the hosted-page success predicate.
pub const ACTION_SUCCESS_RESULT: &str = "SUCCESS";

/// Undo the extra JSON escaping the payload may have picked up in transport.
/// The gateway signs the unescaped form, so this must run before hashing.
pub fn sanitize_payload(raw: &str) -> String {
    raw.replace("\\\"", "\"")
        .replace("\\/", "/")
        .replace("\\\\\\\\", "\\\\")
}

fn signature_message(raw_body: &str, app_key: &str) -> String {
    let mut message = sanitize_payload(raw_body);
    message.push_str(app_key);
    message
}

/// Compute the signature the gateway would attach to `raw_body`:
/// hex-encoded SHA-512 over the sanitized body with the app key appended.
pub fn compute_signature(
    raw_body: &str,
    app_key: &str,
) -> CustomResult<String, common_utils::errors::CryptoError> {
    let digest = crypto::Sha512.generate_digest(signature_message(raw_body, app_key).as_bytes())?;
    Ok(hex::encode(digest))
}

/// Verify a signed notification body. Fails closed: an empty body, an empty
/// signature, a non-UTF-8 body or any internal error all yield `false`.
pub fn verify_payload_signature(
    raw_body: &[u8],
    supplied_signature: &str,
    config: &MerchantConfig,
) -> bool {
    let app_key = config.active_credential().app_key.expose_secret();
    if raw_body.is_empty() || supplied_signature.is_empty() || app_key.is_empty() {
        return false;
    }
    let body = match std::str::from_utf8(raw_body) {
        Ok(body) => body,
        Err(_) => return false,
    };

    let message = signature_message(body, app_key);
    let supplied = supplied_signature.to_ascii_lowercase();
    match crypto::Sha512.verify_signature(&[], supplied.as_bytes(), message.as_bytes()) {
        Ok(verified) => verified,
        Err(error) => {
            tracing::warn!(
                ?error,
                "failed to verify gateway payload signature, treating notification as untrusted"
            );
            false
        }
    }
}

/// Re-encode the received query pairs with the signature parameter removed.
/// The generic redirect family hashes over this canonical form.
pub fn canonical_query_string(
    query_params: &[(String, String)],
) -> CustomResult<String, CallbackError> {
    let filtered: Vec<&(String, String)> = query_params
        .iter()
        .filter(|(key, _)| !key.eq_ignore_ascii_case(consts::X_GP_SIGNATURE))
        .collect();

    serde_urlencoded::to_string(&filtered).change_context(CallbackError::PayloadDecodingFailed)
}

/// Verify a signed query string (generic redirect family). The signature
/// travels as the `X-GP-Signature` query parameter and is computed over the
/// canonicalized remainder of the query with the app key appended.
pub fn verify_query_signature(query_params: &[(String, String)], config: &MerchantConfig) -> bool {
    let supplied = query_params
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(consts::X_GP_SIGNATURE))
        .map(|(_, value)| value.as_str())
        .unwrap_or("");

    let canonical = match canonical_query_string(query_params) {
        Ok(canonical) => canonical,
        Err(error) => {
            tracing::warn!(?error, "failed to canonicalize callback query string");
            return false;
        }
    };

    verify_payload_signature(canonical.as_bytes(), supplied, config)
}

/// The hosted-page success predicate. All three conditions are required; a
/// captured transaction with a soft-declined payment method result is not a
/// success.
pub fn is_approved_capture(notification: &TransactionNotification) -> bool {
    notification.status == TransactionStatus::Captured
        && notification.payment_result_code() == Some(APPROVED_RESULT_CODE)
        && notification.action_result.as_deref() == Some(ACTION_SUCCESS_RESULT)
}

/// Decide whether a just-approved direct authorization must be auto-reversed
/// under the merchant's AVS/CVN thresholds. An authorization carrying neither
/// code is not evaluated.
pub fn should_reverse(
    avs_code: Option<&str>,
    cvn_code: Option<&str>,
    config: &MerchantConfig,
) -> bool {
    let avs = avs_code.unwrap_or("").trim();
    let cvn = cvn_code.unwrap_or("").trim();
    if avs.is_empty() && cvn.is_empty() {
        return false;
    }

    (!avs.is_empty() && config.avs_reject_codes.contains(avs))
        || (!cvn.is_empty() && config.cvn_reject_codes.contains(cvn))
}

/// The three processor-visible callback URLs embedded in a hosted session.
#[derive(Clone, Debug, serde::Serialize)]
pub struct CallbackUrls {
    pub return_url: String,
    pub status_url: String,
    pub cancel_url: String,
}

/// Outbound request creating a hosted payment session.
#[derive(Debug, serde::Serialize)]
pub struct GlobalpayHppRequest {
    pub account_name: String,
    pub channel: String,
    pub amount: String,
    pub currency: String,
    /// Free-text reference the gateway echoes back in notifications; the
    /// parser recovers the order id from it.
    pub reference: String,
    /// One-time nonce preventing replay of the session-creation step.
    pub nonce: String,
    pub notifications: CallbackUrls,
}

/// Build the hosted-session request for an order. The reference embeds the
/// order id in the `Order #<id>` form the callback parser looks for.
pub fn build_hosted_session_request(
    order: &Order,
    store_name: &str,
    urls: CallbackUrls,
) -> GlobalpayHppRequest {
    GlobalpayHppRequest {
        account_name: "transaction_processing".to_owned(),
        channel: "CNP".to_owned(),
        amount: order.amount.get_amount_as_i64().to_string(),
        currency: order.currency.to_string(),
        reference: format!("{} Order #{}", store_name, order.id),
        nonce: common_utils::generate_ref_id(consts::NONCE_LENGTH),
        notifications: urls,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use common_enums::Currency;
    use domain_types::{
        merchant_config::{GatewayCredential, MerchantConfig},
        order::OrderId,
        types::MinorUnit,
    };

    use super::*;

    fn config_with_rejects(avs: &[&str], cvn: &[&str]) -> MerchantConfig {
        MerchantConfig {
            live_mode: false,
            production: GatewayCredential::new("prod-app", "prod-key".to_owned()),
            sandbox: GatewayCredential::new("sandbox-app", "k1".to_owned()),
            avs_reject_codes: avs.iter().map(|s| (*s).to_owned()).collect(),
            cvn_reject_codes: cvn.iter().map(|s| (*s).to_owned()).collect(),
            debug: false,
        }
    }

    #[test]
    fn sanitize_collapses_escaped_json() {
        assert_eq!(
            sanitize_payload(r#"{\"status\":\"CAPTURED\",\"url\":\"a\/b\"}"#),
            r#"{"status":"CAPTURED","url":"a/b"}"#
        );
    }

    #[test]
    fn signature_round_trip() {
        let config = config_with_rejects(&[], &[]);
        let body = r#"{"status":"CAPTURED","id":"TXN123"}"#;
        let signature = compute_signature(body, "k1").unwrap();

        assert!(verify_payload_signature(
            body.as_bytes(),
            &signature,
            &config
        ));
        assert!(!verify_payload_signature(
            br#"{"status":"DECLINED","id":"TXN123"}"#,
            &signature,
            &config
        ));
    }

    #[test]
    fn signature_fails_closed_on_empty_inputs() {
        let config = config_with_rejects(&[], &[]);
        assert!(!verify_payload_signature(b"", "deadbeef", &config));
        assert!(!verify_payload_signature(b"{}", "", &config));
    }

    #[test]
    fn wrong_environment_key_is_indistinguishable_from_tampering() {
        let body = r#"{"status":"CAPTURED"}"#;
        let signature = compute_signature(body, "prod-key").unwrap();

        // sandbox key is active, so a production-signed payload must fail
        let config = config_with_rejects(&[], &[]);
        assert!(!verify_payload_signature(
            body.as_bytes(),
            &signature,
            &config
        ));
    }

    #[test]
    fn query_signature_excludes_signature_param() {
        let config = config_with_rejects(&[], &[]);
        let canonical = "id=TXN123&status=CAPTURED";
        let signature = compute_signature(canonical, "k1").unwrap();

        let query = vec![
            ("id".to_owned(), "TXN123".to_owned()),
            ("status".to_owned(), "CAPTURED".to_owned()),
            ("X-GP-Signature".to_owned(), signature),
        ];
        assert!(verify_query_signature(&query, &config));

        let mut tampered = query;
        tampered[0].1 = "TXN999".to_owned();
        assert!(!verify_query_signature(&tampered, &config));
    }

    #[test]
    fn reversal_policy_requires_a_code() {
        let config = config_with_rejects(&["N"], &["N"]);
        assert!(!should_reverse(None, None, &config));
        assert!(!should_reverse(Some(""), Some(""), &config));
    }

    #[test]
    fn reversal_policy_matches_either_reject_set() {
        let config = config_with_rejects(&["N"], &["P"]);
        assert!(should_reverse(Some("N"), None, &config));
        assert!(should_reverse(None, Some("P"), &config));
        assert!(should_reverse(Some("M"), Some("P"), &config));
        assert!(!should_reverse(Some("M"), Some("M"), &config));
    }

    #[test]
    fn success_predicate_needs_all_three_conditions() {
        let mut notification = TransactionNotification {
            status: TransactionStatus::Captured,
            action_result: Some(ACTION_SUCCESS_RESULT.to_owned()),
            payment_method: Some(domain_types::notification::PaymentMethodDetails {
                result_code: Some(APPROVED_RESULT_CODE.to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(is_approved_capture(&notification));

        notification.action_result = Some("FAILURE".to_owned());
        assert!(!is_approved_capture(&notification));

        notification.action_result = Some(ACTION_SUCCESS_RESULT.to_owned());
        notification.status = TransactionStatus::Preauthorized;
        assert!(!is_approved_capture(&notification));
    }

    #[test]
    fn hosted_session_request_embeds_parseable_reference() {
        let order = Order::new(
            OrderId::new(42),
            "key",
            "globalpay_hpp",
            MinorUnit::new(2599),
            Currency::USD,
        );
        let request = build_hosted_session_request(
            &order,
            "MyStore",
            CallbackUrls {
                return_url: "https://merchant.example/callback/globalpay_hpp_return".to_owned(),
                status_url: "https://merchant.example/callback/globalpay_hpp_status".to_owned(),
                cancel_url: "https://merchant.example/callback/globalpay_hpp_cancel".to_owned(),
            },
        );

        assert_eq!(request.reference, "MyStore Order #42");
        assert_eq!(
            transformers::order_id_from_reference(&request.reference),
            Some(OrderId::new(42))
        );
        assert_eq!(request.nonce.len(), consts::NONCE_LENGTH);
    }
}
