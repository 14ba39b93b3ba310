//! HTTP API server with observability for the order service.
//!
//! Provides REST endpoints for placing orders and moving them through their
//! status lifecycle, with structured logging (tracing), request ids and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderRepository;
use saga::{IdentityValidator, OrderSaga, StockCatalogClient};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// The saga as wired by the server: every collaborator behind a trait object.
pub type SharedOrderSaga = OrderSaga<
    Arc<dyn OrderRepository>,
    Arc<dyn IdentityValidator>,
    Arc<dyn StockCatalogClient>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub saga: SharedOrderSaga,
}

/// Builds application state from the three collaborators.
pub fn create_state(
    orders: Arc<dyn OrderRepository>,
    identity: Arc<dyn IdentityValidator>,
    catalog: Arc<dyn StockCatalogClient>,
    call_timeout: Duration,
) -> Arc<AppState> {
    let saga = OrderSaga::new(orders, identity, catalog).with_call_timeout(call_timeout);
    Arc::new(AppState { saga })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health))
        .route("/orders", post(routes::orders::create))
        .route("/orders/user/{user_id}", get(routes::orders::list_by_user))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}/items", get(routes::orders::items))
        .route("/orders/{id}/status", put(routes::orders::update_status))
        .with_state(state)
        .merge(metrics_router)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
