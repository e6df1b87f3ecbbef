//! HTTP API server for the marketplace order core.
//!
//! Provides REST endpoints for checkout, the order status lifecycle and
//! order queries, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use fulfillment::{
    CoordinatorConfig, InMemoryEmailSender, InMemoryNotificationService, OrderCoordinator,
};
use metrics_exporter_prometheus::PrometheusHandle;
use store::MarketplaceStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: MarketplaceStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/orders/{id}/status",
            put(routes::orders::update_status::<S>),
        )
        .route(
            "/orders/{id}/refund",
            post(routes::orders::request_refund::<S>),
        )
        .route(
            "/orders/{id}/refund/confirm",
            post(routes::orders::confirm_refund::<S>),
        )
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S>))
        .route(
            "/shops/{id}/orders",
            get(routes::orders::list_for_shop::<S>),
        )
        .route(
            "/users/{id}/orders",
            get(routes::orders::list_for_user::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state with in-memory notification and
/// email collaborators.
pub fn create_default_state<S: MarketplaceStore + 'static>(
    store: S,
    config: CoordinatorConfig,
) -> Arc<AppState<S>> {
    let notifier = InMemoryNotificationService::new();
    let mailer = InMemoryEmailSender::new();
    let coordinator =
        OrderCoordinator::with_config(store, notifier.clone(), mailer.clone(), config);

    Arc::new(AppState {
        coordinator,
        notifier,
        mailer,
    })
}
