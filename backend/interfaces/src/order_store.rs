use common_utils::CustomResult;
use domain_types::{
    errors::OrderStoreError,
    order::{Order, OrderId},
};

/// The order storage collaborator, treated as a key-value aggregate store.
///
/// The engine only ever loads a full aggregate and persists it back; there is
/// no partial update surface for callbacks to disagree over.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    async fn load_order(&self, id: OrderId) -> CustomResult<Option<Order>, OrderStoreError>;

    async fn persist_order(&self, order: &Order) -> CustomResult<(), OrderStoreError>;
}
