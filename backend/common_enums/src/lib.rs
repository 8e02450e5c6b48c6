//! Shared vocabularies for the reconciliation service.
//!
//! Two distinct status vocabularies live here on purpose: [`OrderStatus`] is
//! the merchant-facing order lifecycle, [`TransactionStatus`] is the
//! processor's transaction vocabulary. Translating between them is the status
//! mapper's job, never serde's.

/// Merchant-facing order lifecycle status.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    OnHold,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states are never left once entered.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// States in which payment has already been taken (or committed to).
    /// Positive notifications arriving on top of these must be no-ops.
    pub fn is_paid(self) -> bool {
        matches!(self, Self::Processing | Self::Completed)
    }

    /// States from which a pending/failure notification may still move the
    /// order. Mirrors the precondition column of the mapper decision table.
    pub fn awaits_payment(self) -> bool {
        matches!(
            self,
            Self::OnHold | Self::Pending | Self::Cancelled | Self::Failed
        )
    }
}

/// Processor-side transaction status vocabulary.
///
/// Anything the processor sends that is not recognized degrades to
/// [`TransactionStatus::Unknown`] at the serde boundary; parsing a
/// notification never fails on an unexpected status string.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Initiated,
    Preauthorized,
    Captured,
    Declined,
    Cancelled,
    Failed,
    Pending,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// Statuses the mapper folds into a cancellation of the order.
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::Declined | Self::Cancelled | Self::Failed)
    }
}

/// Processing environment a credential is scoped to.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

/// ISO 4217 currency codes accepted by the gateway integration.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum Currency {
    AED,
    AUD,
    CAD,
    CHF,
    CNY,
    CZK,
    DKK,
    EUR,
    GBP,
    HKD,
    HUF,
    INR,
    JPY,
    MXN,
    NOK,
    NZD,
    PHP,
    PLN,
    SEK,
    SGD,
    USD,
    ZAR,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_status_unknown_is_catch_all() {
        let status: TransactionStatus =
            serde_json::from_str("\"SOMETHING_NEW\"").expect("catch-all should absorb");
        assert_eq!(status, TransactionStatus::Unknown);

        let status: TransactionStatus = serde_json::from_str("\"PREAUTHORIZED\"").expect("known");
        assert_eq!(status, TransactionStatus::Preauthorized);
    }

    #[test]
    fn order_status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnHold).expect("serialize"),
            "\"on-hold\""
        );
        assert_eq!(OrderStatus::OnHold.to_string(), "on-hold");
    }

    #[test]
    fn terminal_and_paid_partitions() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(OrderStatus::Processing.is_paid());
        assert!(OrderStatus::Cancelled.awaits_payment());
        assert!(!OrderStatus::Completed.awaits_payment());
    }
}
