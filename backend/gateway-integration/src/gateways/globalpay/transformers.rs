use std::str::FromStr;

use common_enums::{Currency, TransactionStatus};
use common_utils::{consts, ext_traits::BytesExt, CustomResult};
use domain_types::{
    errors::CallbackError,
    notification::{PaymentMethodDetails, TransactionNotification},
    order::OrderId,
    types::MinorUnit,
};
use error_stack::ResultExt;
use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)] // pattern is a literal, checked by the tests below
static ORDER_REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Order #(\d+)").expect("order reference pattern is valid"));

/// Recover the order id from the free-text reference the gateway echoes
/// back, e.g. `"MyStore Order #42"`.
pub fn order_id_from_reference(reference: &str) -> Option<OrderId> {
    ORDER_REFERENCE_RE
        .captures(reference)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<OrderId>().ok())
}

/// Raw notification payload as the gateway posts it. Every field is
/// individually optional; transport quirks must degrade to `None`, never
/// fail the whole decode.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct GlobalpayNotification {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_method: Option<GlobalpayPaymentMethodInfo>,
    #[serde(default)]
    pub action: Option<GlobalpayAction>,
    #[serde(default)]
    pub link_data: Option<GlobalpayLinkData>,
}

#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct GlobalpayPaymentMethodInfo {
    #[serde(default)]
    pub entry_mode: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub card: Option<GlobalpayCardResult>,
}

#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct GlobalpayAction {
    #[serde(default)]
    pub result_code: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct GlobalpayLinkData {
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct GlobalpayCardResult {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub masked_number_last4: Option<String>,
    #[serde(default)]
    pub avs_response_code: Option<String>,
    #[serde(default)]
    pub cvn_response_code: Option<String>,
}

impl GlobalpayNotification {
    /// Degrade the raw payload into the typed notification. The order id is
    /// taken from the reference string when it matches the `Order #<digits>`
    /// pattern, falling back to an explicit `order_id` query parameter.
    pub fn into_notification(self, query_params: &[(String, String)]) -> TransactionNotification {
        let reference = self
            .link_data
            .and_then(|link| link.reference)
            .or(self.reference);

        let order_id = reference
            .as_deref()
            .and_then(order_id_from_reference)
            .or_else(|| order_id_from_query(query_params));

        let status = self
            .status
            .as_deref()
            .map(|status| TransactionStatus::from_str(status).unwrap_or_default())
            .unwrap_or_default();

        let payment_method = self.payment_method.map(|pm| PaymentMethodDetails {
            entry_mode: pm.entry_mode,
            result_code: pm.result,
            message: pm.message,
        });

        TransactionNotification {
            transaction_id: self.id,
            status,
            order_id,
            reference,
            payment_method,
            action_result: self.action.and_then(|action| action.result_code),
            amount: self
                .amount
                .and_then(|amount| amount.parse::<i64>().ok())
                .map(MinorUnit::new),
            currency: self
                .currency
                .and_then(|currency| Currency::from_str(&currency).ok()),
        }
    }
}

fn order_id_from_query(query_params: &[(String, String)]) -> Option<OrderId> {
    query_params
        .iter()
        .find(|(key, _)| key == consts::ORDER_ID_PARAM)
        .and_then(|(_, value)| value.parse::<OrderId>().ok())
}

/// Parse a signed JSON notification body (hosted-page family). An
/// undecodable body is an error — individual missing fields are not.
pub fn notification_from_body(
    body: &[u8],
    query_params: &[(String, String)],
) -> CustomResult<TransactionNotification, CallbackError> {
    let payload: GlobalpayNotification = body
        .parse_struct("GlobalpayNotification")
        .change_context(CallbackError::PayloadDecodingFailed)?;
    Ok(payload.into_notification(query_params))
}

/// Parse a query-parameter notification (generic redirect family), enriched
/// from a JSON body when one was posted alongside. Never fails: anything
/// unreadable degrades field by field.
pub fn notification_from_query(
    body: &[u8],
    query_params: &[(String, String)],
) -> TransactionNotification {
    let from_body = if body.is_empty() {
        GlobalpayNotification::default()
    } else {
        body.parse_struct::<GlobalpayNotification>("GlobalpayNotification")
            .unwrap_or_default()
    };
    let mut notification = from_body.into_notification(query_params);

    let query_value = |key: &str| {
        query_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if notification.transaction_id.is_none() {
        notification.transaction_id = query_value("id");
    }
    if notification.status == TransactionStatus::Unknown {
        if let Some(status) = query_value("status") {
            notification.status = TransactionStatus::from_str(&status).unwrap_or_default();
        }
    }
    if notification.order_id.is_none() {
        notification.order_id = order_id_from_query(query_params);
    }

    notification
}

/// Synchronous confirmation of a direct (non-redirect) authorization.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct AuthorizationConfirmation {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// The gateway's own response code; `10` marks a partial approval.
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub payment_method: Option<GlobalpayPaymentMethodInfo>,
}

impl AuthorizationConfirmation {
    pub fn transaction_status(&self) -> TransactionStatus {
        self.status
            .as_deref()
            .map(|status| TransactionStatus::from_str(status).unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn avs_code(&self) -> Option<&str> {
        self.payment_method
            .as_ref()
            .and_then(|pm| pm.card.as_ref())
            .and_then(|card| card.avs_response_code.as_deref())
    }

    pub fn cvn_code(&self) -> Option<&str> {
        self.payment_method
            .as_ref()
            .and_then(|pm| pm.card.as_ref())
            .and_then(|card| card.cvn_response_code.as_deref())
    }

    pub fn is_partial_approval(&self) -> bool {
        self.response_code.as_deref() == Some(super::PARTIAL_APPROVAL_RESPONSE_CODE)
    }
}
