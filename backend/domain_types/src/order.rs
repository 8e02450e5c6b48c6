use std::{collections::BTreeMap, fmt, num::ParseIntError, str::FromStr};

use common_enums::{Currency, OrderStatus};

use crate::types::MinorUnit;

/// Stable identifier of a merchant order.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// The merchant's record of a purchase attempt.
///
/// Created at checkout submission and mutated only by the reconciliation
/// engine (or the synchronous direct-payment result); never deleted by this
/// subsystem.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Secondary secret preventing order-id enumeration on customer-facing
    /// endpoints.
    pub order_key: String,
    /// Identifier of the payment method (gateway) that handled the order.
    pub gateway: String,
    pub amount: MinorUnit,
    pub currency: Currency,
    pub status: OrderStatus,
    /// External transaction id, set once the processor accepts the attempt.
    /// Every later notification must carry the same id or be rejected.
    pub transaction_id: Option<String>,
    pub captured: bool,
    /// Number of installments chosen at checkout, when the method offers them.
    pub installments: Option<u8>,
    pub notes: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Order {
    pub fn new(
        id: OrderId,
        order_key: impl Into<String>,
        gateway: impl Into<String>,
        amount: MinorUnit,
        currency: Currency,
    ) -> Self {
        Self {
            id,
            order_key: order_key.into(),
            gateway: gateway.into(),
            amount,
            currency,
            status: OrderStatus::Pending,
            transaction_id: None,
            captured: false,
            installments: None,
            notes: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Record the external transaction id if none is set yet. Returns whether
    /// the id was written; an already-pinned id is left untouched.
    pub fn assign_transaction_id(&mut self, transaction_id: &str) -> bool {
        match &self.transaction_id {
            Some(existing) if !existing.is_empty() => false,
            _ => {
                self.transaction_id = Some(transaction_id.to_owned());
                true
            }
        }
    }

    /// Whether a notification carrying `transaction_id` is consistent with
    /// this order. Consistent means: no id pinned yet, or the same id.
    pub fn matches_transaction(&self, transaction_id: &str) -> bool {
        match &self.transaction_id {
            Some(existing) if !existing.is_empty() => existing == transaction_id,
            _ => true,
        }
    }

    pub fn mark_captured(&mut self) {
        self.captured = true;
        self.metadata
            .insert("gateway_captured".to_owned(), "yes".to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(
            OrderId::new(42),
            "wc_order_k3y",
            "globalpay_hpp",
            MinorUnit::new(2599),
            Currency::USD,
        )
    }

    #[test]
    fn transaction_id_is_set_once() {
        let mut order = order();
        assert!(order.assign_transaction_id("TXN123"));
        assert!(!order.assign_transaction_id("TXN999"));
        assert_eq!(order.transaction_id.as_deref(), Some("TXN123"));
    }

    #[test]
    fn transaction_consistency_check() {
        let mut order = order();
        assert!(order.matches_transaction("TXN123"));
        order.assign_transaction_id("TXN123");
        assert!(order.matches_transaction("TXN123"));
        assert!(!order.matches_transaction("TXN999"));
    }

    #[test]
    fn order_id_parses_from_digits() {
        assert_eq!("42".parse::<OrderId>().ok(), Some(OrderId::new(42)));
        assert!("42a".parse::<OrderId>().is_err());
    }
}
