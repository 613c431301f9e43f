//! Session cart endpoints.
//!
//! The client carries its cart id explicitly — a `cart_id` query parameter on
//! GET/DELETE, a body field on POST — and adopts the id returned in each
//! response. A missing, unknown, or abandoned reference transparently yields
//! a fresh cart.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use cart_store::CartStore;
use common::{CartId, ProductId};
use domain::CartView;
use serde::Deserialize;
use session::{CartService, InMemoryProductCatalog};
use sweeper::AbandonmentSweeper;
use uuid::Uuid;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CartStore> {
    pub cart_service: CartService<S, InMemoryProductCatalog>,
    pub catalog: InMemoryProductCatalog,
    pub sweeper: AbandonmentSweeper<S>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub cart_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CartItemRequest {
    pub cart_id: Option<Uuid>,
    pub product_id: String,
    pub quantity: i64,
}

// -- Handlers --

/// GET /cart — render the session's cart, creating one if needed.
#[tracing::instrument(skip(state))]
pub async fn show<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartView>, ApiError> {
    let view = state
        .cart_service
        .current_cart(query.cart_id.map(CartId::from_uuid))
        .await?;
    Ok(Json(view))
}

/// POST /cart — resolve or create the session's cart and add a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CartItemRequest>,
) -> Result<(StatusCode, Json<CartView>), ApiError> {
    let view = add_to_cart(&state, req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /cart/add_item — add a product to the session's cart.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CartItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let view = add_to_cart(&state, req).await?;
    Ok(Json(view))
}

/// DELETE /cart/{product_id} — remove a product from the session's cart.
#[tracing::instrument(skip(state))]
pub async fn destroy_item<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(product_id): Path<String>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartView>, ApiError> {
    let view = state
        .cart_service
        .remove_item(
            query.cart_id.map(CartId::from_uuid),
            &ProductId::new(product_id),
        )
        .await?;
    Ok(Json(view))
}

async fn add_to_cart<S: CartStore + 'static>(
    state: &AppState<S>,
    req: CartItemRequest,
) -> Result<CartView, ApiError> {
    let view = state
        .cart_service
        .add_item(
            req.cart_id.map(CartId::from_uuid),
            &ProductId::new(req.product_id),
            req.quantity,
        )
        .await?;
    Ok(view)
}
