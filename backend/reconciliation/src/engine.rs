//! The order reconciliation engine.
//!
//! Every callback entry point runs the same skeleton: verify the source,
//! parse the payload, load the order, check transaction-id consistency, then
//! dispatch to the status mapper and persist. Steps past parsing run inside
//! a per-order mutex so overlapping callbacks for the same order cannot
//! interleave their read-modify-write on the aggregate.

use std::{collections::HashMap, sync::Arc};

use common_enums::OrderStatus;
use domain_types::{
    errors::CallbackError,
    merchant_config::MerchantConfig,
    notification::TransactionNotification,
    order::{Order, OrderId},
};
use gateway_integration::globalpay::{self, transformers::AuthorizationConfirmation};
use interfaces::{
    callbacks::{NotificationSource, RequestDetails},
    order_store::OrderStore,
    processor_client::{ProcessorClient, VoidReason},
};
use tokio::sync::Mutex;

use crate::status_mapper::{self, MappingOutcome};

/// Terminal result of one callback invocation. The HTTP layer maps each
/// variant onto exactly one response class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CallbackOutcome {
    /// Notification accepted; includes idempotent redeliveries.
    Accepted {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// Consistency violation: the order is pinned to a different transaction.
    /// Reported as success to avoid informative probing, but nothing moved.
    IgnoredMismatch { order_id: OrderId },
    /// Signature missing, wrong, or computed with the wrong key.
    AuthenticationFailed,
    /// Payload undecodable or missing required pieces.
    Malformed,
    /// No order id in the notification, or no such order.
    OrderNotFound,
    /// A collaborator (store, processor) failed; the order keeps its last
    /// known-good state.
    Unavailable,
}

pub struct ReconciliationEngine {
    store: Arc<dyn OrderStore>,
    processor: Arc<dyn ProcessorClient>,
    config: Arc<MerchantConfig>,
    order_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl ReconciliationEngine {
    pub fn new(
        store: Arc<dyn OrderStore>,
        processor: Arc<dyn ProcessorClient>,
        config: Arc<MerchantConfig>,
    ) -> Self {
        Self {
            store,
            processor,
            config,
            order_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn merchant_config(&self) -> &MerchantConfig {
        &self.config
    }

    async fn order_lock(&self, order_id: OrderId) -> Arc<Mutex<()>> {
        let mut locks = self.order_locks.lock().await;
        Arc::clone(locks.entry(order_id.get()).or_default())
    }

    /// Run the full pipeline for a state-changing notification that is
    /// trusted once its signature checks out (hosted-page family, generic
    /// status webhook).
    #[tracing::instrument(skip_all, fields(family = source.family()))]
    pub async fn process_notification(
        &self,
        source: &dyn NotificationSource,
        request: &RequestDetails,
    ) -> CallbackOutcome {
        match source.verify_source(request, &self.config) {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(
                    family = source.family(),
                    "callback signature verification failed, refusing to process"
                );
                return CallbackOutcome::AuthenticationFailed;
            }
            Err(error) => {
                if matches!(
                    error.current_context(),
                    CallbackError::PayloadDecodingFailed
                ) {
                    tracing::warn!(?error, "callback payload undecodable during verification");
                    return CallbackOutcome::Malformed;
                }
                tracing::error!(?error, "callback signature verification errored, failing closed");
                return CallbackOutcome::AuthenticationFailed;
            }
        }

        let notification = match source.parse_notification(request) {
            Ok(notification) => notification,
            Err(error) => {
                tracing::warn!(?error, "failed to parse callback payload");
                return CallbackOutcome::Malformed;
            }
        };

        if self.config.debug {
            tracing::debug!(body = %String::from_utf8_lossy(&request.body), "raw callback payload");
        }

        self.apply_notification(notification).await
    }

    /// Generic redirect family `return`: the callback is only a back
    /// reference. After verifying it, re-query the processor by transaction
    /// id and reconcile against the query result, which is trusted over the
    /// callback body.
    #[tracing::instrument(skip_all, fields(family = source.family()))]
    pub async fn reconcile_by_query(
        &self,
        source: &dyn NotificationSource,
        request: &RequestDetails,
    ) -> CallbackOutcome {
        match source.verify_source(request, &self.config) {
            Ok(true) => {}
            _ => {
                tracing::error!(
                    family = source.family(),
                    "redirect callback signature verification failed"
                );
                return CallbackOutcome::AuthenticationFailed;
            }
        }

        let parsed = match source.parse_notification(request) {
            Ok(notification) => notification,
            Err(error) => {
                tracing::warn!(?error, "failed to parse redirect callback");
                return CallbackOutcome::Malformed;
            }
        };

        let Some(transaction_id) = parsed.transaction_id.clone() else {
            tracing::warn!("redirect callback carried no transaction id");
            return CallbackOutcome::Malformed;
        };

        let authoritative = match self.processor.get_transaction(&transaction_id).await {
            Ok(mut details) => {
                if details.order_id.is_none() {
                    details.order_id = parsed.order_id;
                }
                if details.transaction_id.is_none() {
                    details.transaction_id = Some(transaction_id);
                }
                details
            }
            Err(error) => {
                tracing::error!(?error, %transaction_id, "transaction re-query failed");
                return CallbackOutcome::Unavailable;
            }
        };

        self.apply_notification(authoritative).await
    }

    /// Steps 3–5 of the pipeline: load, guard, map, persist. Runs under the
    /// order's mutex.
    pub async fn apply_notification(
        &self,
        notification: TransactionNotification,
    ) -> CallbackOutcome {
        let Some(order_id) = notification.order_id else {
            tracing::warn!("notification carried no resolvable order reference");
            return CallbackOutcome::OrderNotFound;
        };

        let lock = self.order_lock(order_id).await;
        let _guard = lock.lock().await;

        let mut order = match self.load(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return CallbackOutcome::OrderNotFound,
            Err(outcome) => return outcome,
        };

        if let Some(incoming) = notification.transaction_id.as_deref() {
            if !order.matches_transaction(incoming) {
                tracing::warn!(
                    %order_id,
                    stored = order.transaction_id.as_deref().unwrap_or("-"),
                    incoming,
                    "transaction id mismatch, ignoring notification"
                );
                return CallbackOutcome::IgnoredMismatch { order_id };
            }
        }

        let outcome = status_mapper::apply(&mut order, &notification);
        match outcome {
            MappingOutcome::Idempotent => CallbackOutcome::Accepted {
                order_id,
                status: order.status,
            },
            MappingOutcome::Transitioned(_) | MappingOutcome::Unrecognized => {
                match self.persist(&order).await {
                    Ok(()) => CallbackOutcome::Accepted {
                        order_id,
                        status: order.status,
                    },
                    Err(outcome) => outcome,
                }
            }
        }
    }

    /// Customer-initiated abort. Only orders still awaiting payment are
    /// cancelled; a settled order is left alone regardless of what the
    /// customer's browser replays.
    pub async fn cancel_order(&self, order_id: Option<OrderId>) -> CallbackOutcome {
        let Some(order_id) = order_id else {
            return CallbackOutcome::OrderNotFound;
        };

        let lock = self.order_lock(order_id).await;
        let _guard = lock.lock().await;

        let mut order = match self.load(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return CallbackOutcome::OrderNotFound,
            Err(outcome) => return outcome,
        };

        if order.status.awaits_payment() && order.status != OrderStatus::Cancelled {
            order.add_note("Payment cancelled by the customer before completion.");
            order.status = OrderStatus::Cancelled;
            if let Err(outcome) = self.persist(&order).await {
                return outcome;
            }
        }

        CallbackOutcome::Accepted {
            order_id,
            status: order.status,
        }
    }

    /// Post-authorization check on the direct (non-redirect) path, applied
    /// immediately after the processor approves: partial approvals are
    /// voided outright, then the AVS/CVN reversal policy runs. A failing
    /// reversal or void call is logged and swallowed — the order outcome is
    /// already decided and must read as declined, not as a system error.
    #[tracing::instrument(skip_all, fields(order_id = %order_id))]
    pub async fn apply_direct_authorization(
        &self,
        order_id: OrderId,
        confirmation: &AuthorizationConfirmation,
    ) -> CallbackOutcome {
        let lock = self.order_lock(order_id).await;
        let _guard = lock.lock().await;

        let mut order = match self.load(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return CallbackOutcome::OrderNotFound,
            Err(outcome) => return outcome,
        };

        if confirmation.is_partial_approval() {
            if let Err(error) = self
                .processor
                .void_transaction(&confirmation.id, VoidReason::PartialApproval)
                .await
            {
                tracing::error!(?error, "failed to void partially-approved transaction");
            }
            order.add_note(format!(
                "Transaction {} was only partially approved; voided and marked failed.",
                confirmation.id
            ));
            return self.fail_order(order).await;
        }

        if globalpay::should_reverse(confirmation.avs_code(), confirmation.cvn_code(), &self.config)
        {
            if let Err(error) = self
                .processor
                .reverse_transaction(&confirmation.id, order.amount, order.currency)
                .await
            {
                tracing::error!(?error, "reversal call failed, order remains declined");
            }
            order.add_note(format!(
                "AVS/CVN result rejected by merchant policy; transaction {} reversed for {} {}.",
                confirmation.id, order.amount, order.currency
            ));
            return self.fail_order(order).await;
        }

        let notification = TransactionNotification {
            transaction_id: Some(confirmation.id.clone()),
            status: confirmation.transaction_status(),
            order_id: Some(order_id),
            payment_method: None,
            reference: confirmation.reference.clone(),
            action_result: None,
            amount: None,
            currency: None,
        };

        status_mapper::apply(&mut order, &notification);
        match self.persist(&order).await {
            Ok(()) => CallbackOutcome::Accepted {
                order_id,
                status: order.status,
            },
            Err(outcome) => outcome,
        }
    }

    async fn fail_order(&self, mut order: Order) -> CallbackOutcome {
        order.status = OrderStatus::Failed;
        let order_id = order.id;
        match self.persist(&order).await {
            Ok(()) => CallbackOutcome::Accepted {
                order_id,
                status: OrderStatus::Failed,
            },
            Err(outcome) => outcome,
        }
    }

    async fn load(&self, order_id: OrderId) -> Result<Option<Order>, CallbackOutcome> {
        self.store.load_order(order_id).await.map_err(|error| {
            tracing::error!(?error, %order_id, "failed to load order");
            CallbackOutcome::Unavailable
        })
    }

    async fn persist(&self, order: &Order) -> Result<(), CallbackOutcome> {
        self.store.persist_order(order).await.map_err(|error| {
            tracing::error!(?error, order_id = %order.id, "failed to persist order");
            CallbackOutcome::Unavailable
        })
    }
}
