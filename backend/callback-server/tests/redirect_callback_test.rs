#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use common_enums::{OrderStatus, TransactionStatus};
use domain_types::{notification::TransactionNotification, order::OrderId};

/// Sign the given pairs the way the gateway does: over the canonicalized
/// query string with the signature parameter excluded.
fn signed_query(pairs: &[(&str, &str)]) -> String {
    let canonical = serde_urlencoded::to_string(pairs).unwrap();
    let signature = sign(&canonical);
    format!("{canonical}&X-GP-Signature={signature}")
}

fn get(uri: String) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn status_webhook_is_authoritative_and_drives_capture() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    let query = signed_query(&[("id", "TXN9"), ("status", "CAPTURED"), ("order_id", "42")]);
    let response = send(
        &h.router,
        post(format!("/callback/globalpay_redirect_status?{query}")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.transaction_id.as_deref(), Some("TXN9"));

    // unlike `return`, the status webhook trusts its own payload
    assert_eq!(*h.processor.query_count.lock().await, 0);
}

#[tokio::test]
async fn status_webhook_rejects_tampered_query() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    let query = signed_query(&[("id", "TXN9"), ("status", "DECLINED"), ("order_id", "42")]);
    let tampered = query.replace("DECLINED", "CAPTURED");
    let response = send(
        &h.router,
        post(format!("/callback/globalpay_redirect_status?{tampered}")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn return_requeries_the_processor_and_trusts_the_result() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    // callback claims PENDING; the processor's answer is CAPTURED
    *h.processor.transaction.lock().await = Some(TransactionNotification {
        transaction_id: Some("TXN9".to_owned()),
        status: TransactionStatus::Captured,
        order_id: Some(OrderId::new(42)),
        ..Default::default()
    });

    let query = signed_query(&[("id", "TXN9"), ("status", "PENDING"), ("order_id", "42")]);
    let response = send(
        &h.router,
        get(format!("/callback/globalpay_redirect_return?{query}")),
    )
    .await;

    assert_redirect(&response, ORDER_RECEIVED_URL);
    assert_eq!(*h.processor.query_count.lock().await, 1);

    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
}

#[tokio::test]
async fn return_with_declined_outcome_redirects_back_to_checkout() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    *h.processor.transaction.lock().await = Some(TransactionNotification {
        transaction_id: Some("TXN9".to_owned()),
        status: TransactionStatus::Declined,
        order_id: Some(OrderId::new(42)),
        ..Default::default()
    });

    let query = signed_query(&[("id", "TXN9"), ("order_id", "42")]);
    let response = send(
        &h.router,
        get(format!("/callback/globalpay_redirect_return?{query}")),
    )
    .await;

    assert_redirect(&response, CHECKOUT_URL);
    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn return_rejects_missing_signature() {
    let h = harness();
    seed_order(&h.store, 42).await;

    let response = send(
        &h.router,
        get("/callback/globalpay_redirect_return?id=TXN9&order_id=42".to_owned()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn return_degrades_when_processor_is_unreachable() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    // no programmed transaction: the re-query fails
    let query = signed_query(&[("id", "TXN9"), ("order_id", "42")]);
    let response = send(
        &h.router,
        get(format!("/callback/globalpay_redirect_return?{query}")),
    )
    .await;

    // single failure, no retry loop: the customer lands back on checkout
    // and the order keeps its last known-good state
    assert_redirect(&response, CHECKOUT_URL);
    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn cancel_aborts_awaiting_order_and_redirects() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    let response = send(
        &h.router,
        get("/callback/globalpay_redirect_cancel?order_id=42".to_owned()),
    )
    .await;

    assert_redirect(&response, &format!("{CHECKOUT_URL}?cancelled=1"));
    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn cancel_cannot_undo_a_settled_order() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    let query = signed_query(&[("id", "TXN9"), ("status", "CAPTURED"), ("order_id", "42")]);
    send(
        &h.router,
        post(format!("/callback/globalpay_redirect_status?{query}")),
    )
    .await;

    let response = send(
        &h.router,
        get("/callback/globalpay_redirect_cancel?order_id=42".to_owned()),
    )
    .await;

    assert_redirect(&response, &format!("{CHECKOUT_URL}?cancelled=1"));
    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
}

#[tokio::test]
async fn unknown_status_leaves_order_unchanged_with_note() {
    let h = harness();
    let order_id = seed_order(&h.store, 42).await;

    let query = signed_query(&[("id", "TXN9"), ("status", "FOR_REVIEW"), ("order_id", "42")]);
    let response = send(
        &h.router,
        post(format!("/callback/globalpay_redirect_status?{query}")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let order = h.store.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.notes.len(), 1);
    assert!(order.notes.first().unwrap().contains("UNKNOWN"));
}
