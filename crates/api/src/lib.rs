//! HTTP API server with observability for the cart system.
//!
//! Provides the cart endpoints (session-scoped show/add/remove), a minimal
//! product resource backing the in-memory catalog, and the cleanup trigger,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use cart_store::CartStore;
use metrics_exporter_prometheus::PrometheusHandle;
use session::{CartService, InMemoryProductCatalog};
use sweeper::AbandonmentSweeper;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::carts::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CartStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::carts::show::<S>))
        .route("/cart", post(routes::carts::create::<S>))
        .route("/cart/add_item", post(routes::carts::add_item::<S>))
        .route("/cart/{product_id}", delete(routes::carts::destroy_item::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/{id}", get(routes::products::show::<S>))
        .route("/cleanup", post(routes::cleanup::run::<S>))
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

/// Creates the default application state over a store and a fresh in-memory
/// product catalog. The catalog handle is returned alongside so callers can
/// seed listings.
pub fn create_default_state<S: CartStore + Clone + 'static>(
    store: S,
) -> (Arc<AppState<S>>, InMemoryProductCatalog) {
    let catalog = InMemoryProductCatalog::new();

    let state = Arc::new(AppState {
        cart_service: CartService::new(store.clone(), catalog.clone()),
        catalog: catalog.clone(),
        sweeper: AbandonmentSweeper::new(store),
    });

    (state, catalog)
}
