//! Transport-neutral view of an inbound callback and the per-family
//! extraction contract the reconciliation engine is parameterized by.

use std::collections::HashMap;

use common_utils::CustomResult;
use domain_types::{
    errors::CallbackError, merchant_config::MerchantConfig, notification::TransactionNotification,
};

/// Everything a callback handler received, divorced from the HTTP framework.
///
/// Header names are stored lowercased; query parameters keep their received
/// order because the generic family's signature is computed over the
/// canonicalized query string.
#[derive(Clone, Debug, Default)]
pub struct RequestDetails {
    pub headers: HashMap<String, String>,
    pub query_params: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RequestDetails {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| &**v)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| &**v)
    }
}

/// One callback family's conventions: where its signature lives, what it is
/// computed over, and how a typed notification is extracted from the payload.
///
/// The engine runs the same verify → parse → load → guard → map pipeline for
/// every family; implementations of this trait are the only part that differs
/// between the hosted-page family and the generic redirect family.
pub trait NotificationSource: Send + Sync {
    /// Family label used in logs and metrics.
    fn family(&self) -> &'static str;

    /// Authenticate the request. `Ok(false)` and `Err(_)` are both treated as
    /// "untrusted" by the engine; implementations fail closed on any internal
    /// failure and must never fall back to another key.
    fn verify_source(
        &self,
        request: &RequestDetails,
        config: &MerchantConfig,
    ) -> CustomResult<bool, CallbackError>;

    /// Extract a typed notification. Field-level degradation happens here;
    /// an `Err` means the payload as a whole was undecodable.
    fn parse_notification(
        &self,
        request: &RequestDetails,
    ) -> CustomResult<TransactionNotification, CallbackError>;
}
