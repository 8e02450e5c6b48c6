use std::{net, sync::Arc};

use axum::{
    http,
    routing::{get, post},
    Router,
};
use common_utils::consts;
use gateway_integration::globalpay::client::GlobalpayClient;
use interfaces::{order_store::OrderStore, processor_client::ProcessorClient};
use reconciliation::{storage::InMemoryOrderStore, ReconciliationEngine};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::oneshot,
};
use tower_http::{request_id::MakeRequestUuid, trace as tower_trace};

use crate::{configs, error::ConfigurationError, logger, metrics, server, state::AppState, utils};

/// # Panics
///
/// Will panic if signal handler installation fails
pub async fn server_builder(config: configs::Config) -> Result<(), ConfigurationError> {
    let server_config = config.server.clone();
    let socket_addr = net::SocketAddr::new(server_config.host.parse()?, server_config.port);

    // Signal handler
    let (tx, rx) = oneshot::channel();

    #[allow(clippy::expect_used)]
    tokio::spawn(async move {
        let mut sig_int =
            signal(SignalKind::interrupt()).expect("Failed to initialize SIGINT signal handler");
        let mut sig_term =
            signal(SignalKind::terminate()).expect("Failed to initialize SIGTERM signal handler");
        let mut sig_quit =
            signal(SignalKind::quit()).expect("Failed to initialize QUIT signal handler");
        let mut sig_hup =
            signal(SignalKind::hangup()).expect("Failed to initialize SIGHUP signal handler");

        tokio::select! {
            _ = sig_int.recv() => {
                logger::info!("Received SIGINT");
                tx.send(()).expect("Failed to send SIGINT signal");
            }
            _ = sig_term.recv() => {
                logger::info!("Received SIGTERM");
                tx.send(()).expect("Failed to send SIGTERM signal");
            }
            _ = sig_quit.recv() => {
                logger::info!("Received QUIT");
                tx.send(()).expect("Failed to send QUIT signal");
            }
            _ = sig_hup.recv() => {
                logger::info!("Received SIGHUP");
                tx.send(()).expect("Failed to send SIGHUP signal");
            }
        }
    });

    #[allow(clippy::expect_used)]
    let shutdown_signal = async {
        rx.await.expect("Failed to receive shutdown signal");
        logger::info!("Shutdown signal received");
    };

    let state = app_state(&config);

    logger::info!(
        host = %server_config.host,
        port = %server_config.port,
        live_mode = config.merchant.live_mode,
        "starting reconciliation callback server"
    );

    let listener = tokio::net::TcpListener::bind(socket_addr).await?;

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

/// Wire the engine against the configured collaborators.
pub fn app_state(config: &configs::Config) -> AppState {
    let (app_id, app_key) = config.merchant.active_credentials();
    let processor: Arc<dyn ProcessorClient> = Arc::new(GlobalpayClient::new(
        config.gateway.api_base_url.clone(),
        app_id,
        app_key,
    ));
    let store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
    let engine = Arc::new(ReconciliationEngine::new(
        store,
        processor,
        Arc::new(config.merchant.merchant_config()),
    ));

    AppState::new(engine, Arc::new(config.gateway.clone()))
}

/// The callback router. Exposed for the integration tests, which drive it
/// through `tower::ServiceExt` without binding a socket.
pub fn router(state: AppState) -> Router {
    let logging_layer = tower_trace::TraceLayer::new_for_http()
        .make_span_with(|request: &axum::extract::Request<_>| {
            utils::record_fields_from_header(request)
        })
        .on_request(tower_trace::DefaultOnRequest::new().level(tracing::Level::INFO))
        .on_response(
            tower_trace::DefaultOnResponse::new()
                .level(tracing::Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
        .on_failure(
            tower_trace::DefaultOnFailure::new()
                .latency_unit(tower_http::LatencyUnit::Micros)
                .level(tracing::Level::ERROR),
        );

    let request_id_layer = tower_http::request_id::SetRequestIdLayer::new(
        http::HeaderName::from_static(consts::X_REQUEST_ID),
        MakeRequestUuid,
    );

    let propagate_request_id_layer = tower_http::request_id::PropagateRequestIdLayer::new(
        http::HeaderName::from_static(consts::X_REQUEST_ID),
    );

    Router::new()
        .route("/health", get(server::health_check::health))
        // hosted-payment-page family
        .route(
            "/callback/globalpay_hpp_return",
            get(server::hpp::hpp_return).post(server::hpp::hpp_return),
        )
        .route("/callback/globalpay_hpp_status", post(server::hpp::hpp_status))
        .route(
            "/callback/globalpay_hpp_cancel",
            get(server::hpp::hpp_cancel).post(server::hpp::hpp_cancel),
        )
        .route("/callback/globalpay_hpp_final", post(server::hpp::hpp_final))
        // generic asynchronous-method family
        .route(
            "/callback/globalpay_redirect_return",
            get(server::redirect::redirect_return).post(server::redirect::redirect_return),
        )
        .route(
            "/callback/globalpay_redirect_status",
            post(server::redirect::redirect_status),
        )
        .route(
            "/callback/globalpay_redirect_cancel",
            get(server::redirect::redirect_cancel).post(server::redirect::redirect_cancel),
        )
        .layer(logging_layer)
        .layer(request_id_layer)
        .layer(propagate_request_id_layer)
        .with_state(state)
}

pub async fn metrics_server_builder(config: configs::Config) -> Result<(), ConfigurationError> {
    let listener = config.metrics.tcp_listener().await?;

    let router = Router::new().route(
        "/metrics",
        get(|| async {
            let output = metrics::metrics_handler().await;
            match output {
                Ok(metrics) => Ok(metrics),
                Err(error) => {
                    tracing::error!(?error, "Error fetching metrics");

                    Err((
                        http::StatusCode::INTERNAL_SERVER_ERROR,
                        "Error fetching metrics".to_string(),
                    ))
                }
            }
        }),
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async {
            let output = tokio::signal::ctrl_c().await;
            tracing::error!(?output, "shutting down");
        })
        .await?;

    Ok(())
}
