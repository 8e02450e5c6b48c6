//! In-memory order store.
//!
//! The real order storage belongs to the storefront and sits behind the
//! [`OrderStore`] trait; this implementation backs the server binary in
//! development and the integration tests.

use std::collections::HashMap;

use common_utils::CustomResult;
use domain_types::{
    errors::OrderStoreError,
    order::{Order, OrderId},
};
use interfaces::order_store::OrderStore;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<u64, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: Order) {
        self.orders.write().await.insert(order.id.get(), order);
    }

    pub async fn get(&self, id: OrderId) -> Option<Order> {
        self.orders.read().await.get(&id.get()).cloned()
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn load_order(&self, id: OrderId) -> CustomResult<Option<Order>, OrderStoreError> {
        Ok(self.orders.read().await.get(&id.get()).cloned())
    }

    async fn persist_order(&self, order: &Order) -> CustomResult<(), OrderStoreError> {
        self.orders
            .write()
            .await
            .insert(order.id.get(), order.clone());
        Ok(())
    }
}
