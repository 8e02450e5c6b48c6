use common_enums::Currency;
use common_utils::CustomResult;
use domain_types::{
    errors::GatewayClientError, notification::TransactionNotification, types::MinorUnit,
};

/// Reason code attached to a proactive void.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VoidReason {
    PartialApproval,
}

/// Outbound calls to the processor's transaction API.
///
/// The generic redirect family re-queries the processor by transaction id
/// instead of trusting the callback body; the reversal policy issues
/// reversals and voids through the same seam. All calls are single-shot —
/// no retry loop lives behind this trait.
#[async_trait::async_trait]
pub trait ProcessorClient: Send + Sync {
    /// Fetch the authoritative state of a transaction.
    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> CustomResult<TransactionNotification, GatewayClientError>;

    /// Reverse an approved authorization for the given amount.
    async fn reverse_transaction(
        &self,
        transaction_id: &str,
        amount: MinorUnit,
        currency: Currency,
    ) -> CustomResult<(), GatewayClientError>;

    /// Void a transaction with a fixed reason code.
    async fn void_transaction(
        &self,
        transaction_id: &str,
        reason: VoidReason,
    ) -> CustomResult<(), GatewayClientError>;
}
