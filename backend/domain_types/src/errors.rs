use crate::order::OrderId;

/// Failure classes of the callback processing pipeline.
///
/// Each class maps onto exactly one HTTP response family at the handler
/// boundary; the mapping itself lives in the server crate.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum CallbackError {
    #[error("Notification signature verification failed")]
    SignatureVerificationFailed,
    #[error("Notification payload could not be decoded")]
    PayloadDecodingFailed,
    #[error("No order reference found in notification")]
    OrderReferenceNotFound,
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Notification transaction id does not match order {order_id}")]
    TransactionMismatch { order_id: OrderId },
    #[error("Required field {field_name} missing from notification")]
    MissingRequiredField { field_name: &'static str },
}

/// Failures of outbound calls to the processor (re-query, reversal, void).
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum GatewayClientError {
    #[error("Failed to obtain gateway access token")]
    AccessTokenFailure,
    #[error("Failed to send request to gateway")]
    RequestNotSent,
    #[error("Failed to decode gateway response")]
    ResponseDecodingFailed,
    #[error("Transaction {0} not found at gateway")]
    TransactionNotFound(String),
    #[error("Gateway responded with unexpected response")]
    UnexpectedServerResponse,
}

/// Failures of the order storage collaborator.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum OrderStoreError {
    #[error("Order storage unavailable")]
    Unavailable,
    #[error("Failed to persist order")]
    PersistFailed,
}
