#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::{collections::HashSet, sync::Arc};

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use callback_server::{app, configs::GatewaySettings, state::AppState};
use common_enums::Currency;
use common_utils::CustomResult;
use domain_types::{
    errors::GatewayClientError,
    merchant_config::{GatewayCredential, MerchantConfig},
    notification::TransactionNotification,
    order::{Order, OrderId},
    types::MinorUnit,
};
use gateway_integration::globalpay;
use http_body_util::BodyExt;
use interfaces::{
    order_store::OrderStore,
    processor_client::{ProcessorClient, VoidReason},
};
use reconciliation::{storage::InMemoryOrderStore, ReconciliationEngine};
use tokio::sync::Mutex;
use tower::util::ServiceExt;

/// Sandbox app key every test payload is signed with.
pub const APP_KEY: &str = "k1";

pub const CHECKOUT_URL: &str = "http://merchant.test/checkout";
pub const ORDER_RECEIVED_URL: &str = "http://merchant.test/checkout/order-received";

/// Processor stub: records reversal/void calls and serves a programmable
/// transaction for re-queries.
#[derive(Default)]
pub struct MockProcessorClient {
    pub transaction: Mutex<Option<TransactionNotification>>,
    pub query_count: Mutex<u32>,
    pub reversals: Mutex<Vec<(String, i64)>>,
    pub voids: Mutex<Vec<(String, VoidReason)>>,
}

#[async_trait::async_trait]
impl ProcessorClient for MockProcessorClient {
    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> CustomResult<TransactionNotification, GatewayClientError> {
        *self.query_count.lock().await += 1;
        match self.transaction.lock().await.clone() {
            Some(details) => Ok(details),
            None => Err(error_stack::report!(
                GatewayClientError::TransactionNotFound(transaction_id.to_owned())
            )),
        }
    }

    async fn reverse_transaction(
        &self,
        transaction_id: &str,
        amount: MinorUnit,
        _currency: Currency,
    ) -> CustomResult<(), GatewayClientError> {
        self.reversals
            .lock()
            .await
            .push((transaction_id.to_owned(), amount.get_amount_as_i64()));
        Ok(())
    }

    async fn void_transaction(
        &self,
        transaction_id: &str,
        reason: VoidReason,
    ) -> CustomResult<(), GatewayClientError> {
        self.voids
            .lock()
            .await
            .push((transaction_id.to_owned(), reason));
        Ok(())
    }
}

pub struct TestHarness {
    pub router: Router,
    pub store: Arc<InMemoryOrderStore>,
    pub processor: Arc<MockProcessorClient>,
}

pub fn harness() -> TestHarness {
    let store = Arc::new(InMemoryOrderStore::new());
    let processor = Arc::new(MockProcessorClient::default());

    let merchant_config = MerchantConfig {
        live_mode: false,
        production: GatewayCredential::new("prod-app", "prod-key".to_owned()),
        sandbox: GatewayCredential::new("sandbox-app", APP_KEY.to_owned()),
        avs_reject_codes: HashSet::from(["N".to_owned()]),
        cvn_reject_codes: HashSet::from(["N".to_owned()]),
        debug: false,
    };

    let engine = Arc::new(ReconciliationEngine::new(
        Arc::clone(&store) as Arc<dyn OrderStore>,
        Arc::clone(&processor) as Arc<dyn ProcessorClient>,
        Arc::new(merchant_config),
    ));

    let gateway = GatewaySettings {
        api_base_url: "https://gateway.test/ucp".to_owned(),
        callback_base_url: "http://merchant.test".to_owned(),
        checkout_url: CHECKOUT_URL.to_owned(),
        order_received_url: ORDER_RECEIVED_URL.to_owned(),
    };

    TestHarness {
        router: app::router(AppState::new(engine, Arc::new(gateway))),
        store,
        processor,
    }
}

pub async fn seed_order(store: &InMemoryOrderStore, id: u64) -> OrderId {
    let order_id = OrderId::new(id);
    store
        .insert(Order::new(
            order_id,
            "wc_order_k3y",
            "globalpay_hpp",
            MinorUnit::new(2599),
            Currency::USD,
        ))
        .await;
    order_id
}

pub fn sign(payload: &str) -> String {
    globalpay::compute_signature(payload, APP_KEY).unwrap()
}

/// The worked example notification body for order 42 / transaction TXN123.
pub fn captured_body_for_order_42() -> String {
    r#"{"status":"CAPTURED","id":"TXN123","payment_method":{"result":"00"},"action":{"result_code":"SUCCESS"},"link_data":{"reference":"MyStore Order #42"}}"#.to_owned()
}

pub fn notification_body(status: &str, transaction_id: &str, order_id: u64) -> String {
    format!(
        r#"{{"status":"{status}","id":"{transaction_id}","payment_method":{{"result":"00"}},"action":{{"result_code":"SUCCESS"}},"link_data":{{"reference":"MyStore Order #{order_id}"}}}}"#
    )
}

/// Build the form body the interstitial page posts to `final`.
pub fn final_form(payload: &str, signature: &str) -> String {
    serde_urlencoded::to_string([("X-GP-Signature", signature), ("gateway_response", payload)])
        .unwrap()
}

pub fn post_final(form: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/callback/globalpay_hpp_final")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location_header(response: &Response<Body>) -> String {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

pub fn assert_redirect(response: &Response<Body>, expected_location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_header(response), expected_location);
}
