//! Decision table translating processor transaction statuses into order
//! lifecycle transitions.
//!
//! Every arm is guarded by the order's *current* status. Notifications are
//! redelivered by the processor and replayed by customers; the guard is what
//! keeps capture side effects and order notes from firing twice. There is no
//! separate dedup store.

use common_enums::{OrderStatus, TransactionStatus};
use common_utils::consts;
use domain_types::{notification::TransactionNotification, order::Order};

/// What applying a notification to an order actually did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MappingOutcome {
    /// The order moved to a new status; side effects were applied.
    Transitioned(OrderStatus),
    /// The notification was consistent but the order had already advanced
    /// past it (redelivery, replay, or out-of-order arrival). No-op.
    Idempotent,
    /// The processor status is not part of the decision table. A note is
    /// recorded; the order status is untouched.
    Unrecognized,
}

/// Apply a verified, consistent notification to the order.
pub fn apply(order: &mut Order, notification: &TransactionNotification) -> MappingOutcome {
    let txn = notification.transaction_id.as_deref().unwrap_or("-");

    match notification.status {
        TransactionStatus::Preauthorized => {
            if order.status.is_paid() {
                return MappingOutcome::Idempotent;
            }
            if let Some(transaction_id) = notification.transaction_id.as_deref() {
                order.assign_transaction_id(transaction_id);
            }
            order.add_note(format!(
                "Transaction {txn} pre-authorized by the processor, awaiting capture."
            ));
            order.status = OrderStatus::Processing;
            MappingOutcome::Transitioned(OrderStatus::Processing)
        }
        TransactionStatus::Captured => {
            if order.status.is_paid() {
                return MappingOutcome::Idempotent;
            }
            if let Some(transaction_id) = notification.transaction_id.as_deref() {
                order.assign_transaction_id(transaction_id);
            }
            order.mark_captured();
            order.add_note(format!(
                "Payment of {} {} completed (transaction {txn}).",
                order.amount, order.currency
            ));
            order.status = OrderStatus::Completed;
            MappingOutcome::Transitioned(OrderStatus::Completed)
        }
        TransactionStatus::Pending => {
            if !order.status.awaits_payment() || order.status == OrderStatus::Pending {
                return MappingOutcome::Idempotent;
            }
            order.add_note(format!(
                "Transaction {txn} reported pending, awaiting confirmation from the processor."
            ));
            order.status = OrderStatus::Pending;
            MappingOutcome::Transitioned(OrderStatus::Pending)
        }
        status if status.is_rejection() => {
            if !order.status.awaits_payment() || order.status == OrderStatus::Cancelled {
                return MappingOutcome::Idempotent;
            }
            let reason = notification
                .payment_message()
                .unwrap_or(consts::NO_ERROR_MESSAGE);
            order.add_note(format!("Transaction {txn} {status}: {reason}"));
            order.status = OrderStatus::Cancelled;
            MappingOutcome::Transitioned(OrderStatus::Cancelled)
        }
        status => {
            tracing::warn!(
                order_id = %order.id,
                transaction_status = %status,
                "received transaction status outside the decision table, leaving order unchanged"
            );
            order.add_note(format!(
                "Received unhandled transaction status {status} from the processor."
            ));
            MappingOutcome::Unrecognized
        }
    }
}

#[cfg(test)]
mod tests {
    use common_enums::Currency;
    use domain_types::{
        notification::PaymentMethodDetails,
        order::OrderId,
        types::MinorUnit,
    };

    use super::*;

    fn order() -> Order {
        Order::new(
            OrderId::new(42),
            "key",
            "globalpay_hpp",
            MinorUnit::new(2599),
            Currency::USD,
        )
    }

    fn notification(status: TransactionStatus) -> TransactionNotification {
        TransactionNotification {
            transaction_id: Some("TXN123".to_owned()),
            status,
            order_id: Some(OrderId::new(42)),
            ..Default::default()
        }
    }

    #[test]
    fn captured_completes_a_pending_order_once() {
        let mut order = order();
        let outcome = apply(&mut order, &notification(TransactionStatus::Captured));

        assert_eq!(outcome, MappingOutcome::Transitioned(OrderStatus::Completed));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.transaction_id.as_deref(), Some("TXN123"));
        assert!(order.captured);
        assert_eq!(order.notes.len(), 1);

        // redelivery is a no-op: no second note, no second capture
        let outcome = apply(&mut order, &notification(TransactionStatus::Captured));
        assert_eq!(outcome, MappingOutcome::Idempotent);
        assert_eq!(order.notes.len(), 1);
    }

    #[test]
    fn preauthorized_moves_to_processing_and_pins_transaction() {
        let mut order = order();
        let outcome = apply(&mut order, &notification(TransactionStatus::Preauthorized));

        assert_eq!(outcome, MappingOutcome::Transitioned(OrderStatus::Processing));
        assert_eq!(order.transaction_id.as_deref(), Some("TXN123"));
        assert!(!order.captured);
    }

    #[test]
    fn no_backward_transition_from_completed() {
        let mut order = order();
        apply(&mut order, &notification(TransactionStatus::Captured));

        for status in [TransactionStatus::Preauthorized, TransactionStatus::Pending] {
            let outcome = apply(&mut order, &notification(status));
            assert_eq!(outcome, MappingOutcome::Idempotent);
            assert_eq!(order.status, OrderStatus::Completed);
        }
    }

    #[test]
    fn rejection_cancels_an_awaiting_order_with_reason() {
        let mut order = order();
        let mut declined = notification(TransactionStatus::Declined);
        declined.payment_method = Some(PaymentMethodDetails {
            message: Some("Insufficient funds".to_owned()),
            ..Default::default()
        });

        let outcome = apply(&mut order, &declined);
        assert_eq!(outcome, MappingOutcome::Transitioned(OrderStatus::Cancelled));
        assert!(order.notes[0].contains("Insufficient funds"));

        // a second rejection does not append another note
        let outcome = apply(&mut order, &declined);
        assert_eq!(outcome, MappingOutcome::Idempotent);
        assert_eq!(order.notes.len(), 1);
    }

    #[test]
    fn rejection_does_not_cancel_a_paid_order() {
        let mut order = order();
        apply(&mut order, &notification(TransactionStatus::Captured));

        let outcome = apply(&mut order, &notification(TransactionStatus::Failed));
        assert_eq!(outcome, MappingOutcome::Idempotent);
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[test]
    fn pending_is_idempotent_when_already_pending() {
        let mut order = order();
        assert_eq!(
            apply(&mut order, &notification(TransactionStatus::Pending)),
            MappingOutcome::Idempotent
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.notes.is_empty());
    }

    #[test]
    fn pending_resurrects_a_cancelled_order() {
        let mut order = order();
        apply(&mut order, &notification(TransactionStatus::Declined));
        assert_eq!(order.status, OrderStatus::Cancelled);

        let outcome = apply(&mut order, &notification(TransactionStatus::Pending));
        assert_eq!(outcome, MappingOutcome::Transitioned(OrderStatus::Pending));
    }

    #[test]
    fn unknown_status_records_note_without_transition() {
        let mut order = order();
        let outcome = apply(&mut order, &notification(TransactionStatus::Initiated));

        assert_eq!(outcome, MappingOutcome::Unrecognized);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.notes.len(), 1);
        assert!(order.notes[0].contains("INITIATED"));
    }
}
