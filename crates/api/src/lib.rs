//! HTTP API server for the marketplace checkout.
//!
//! Provides REST endpoints for carts, checkout and orders, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::{CartService, CheckoutConfig, CheckoutOrchestrator, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::CheckoutStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CheckoutStore> {
    pub carts: CartService<S>,
    pub checkout: CheckoutOrchestrator<S>,
    pub orders: OrderService<S>,
}

impl<S: CheckoutStore + Clone> AppState<S> {
    /// Wires every service onto the same store.
    pub fn new(store: S, config: CheckoutConfig) -> Self {
        Self {
            carts: CartService::new(store.clone()),
            checkout: CheckoutOrchestrator::new(store.clone(), config),
            orders: OrderService::new(store, config),
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CheckoutStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route("/cart/items/{id}", put(routes::cart::update_item::<S>))
        .route("/checkout", post(routes::checkout::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/orders/{id}/payment",
            post(routes::orders::record_payment::<S>),
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
