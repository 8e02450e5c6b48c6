use common_enums::{Currency, TransactionStatus};

use crate::{order::OrderId, types::MinorUnit};

/// Payment-method sub-fields echoed inside a transaction notification.
/// Each field is independently optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PaymentMethodDetails {
    pub entry_mode: Option<String>,
    pub result_code: Option<String>,
    pub message: Option<String>,
}

/// A parsed, typed transaction notification.
///
/// This is what the payload parser hands to the reconciliation engine:
/// everything the heterogeneous callback payloads may carry, with absent or
/// malformed fields already degraded to `None` / `Unknown`. Sufficiency
/// checks (was an order id found at all?) are the engine's responsibility.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TransactionNotification {
    pub transaction_id: Option<String>,
    pub status: TransactionStatus,
    pub order_id: Option<OrderId>,
    /// The raw reference string the order id was extracted from, kept for
    /// order notes and logs.
    pub reference: Option<String>,
    pub payment_method: Option<PaymentMethodDetails>,
    /// Result of the gateway-side action wrapper, when present.
    pub action_result: Option<String>,
    pub amount: Option<MinorUnit>,
    pub currency: Option<Currency>,
}

impl TransactionNotification {
    pub fn payment_result_code(&self) -> Option<&str> {
        self.payment_method
            .as_ref()
            .and_then(|pm| pm.result_code.as_deref())
    }

    pub fn payment_message(&self) -> Option<&str> {
        self.payment_method
            .as_ref()
            .and_then(|pm| pm.message.as_deref())
    }
}
