//! Product resource backing the in-memory catalog.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart_store::CartStore;
use common::ProductId;
use domain::{Money, Product};
use serde::{Deserialize, Serialize};
use session::ProductCatalog;

use crate::error::ApiError;
use crate::routes::carts::AppState;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    /// Optional SKU; generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub price_cents: i64,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            price_cents: product.price.cents(),
        }
    }
}

/// POST /products — add or replace a catalog listing.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    if req.price_cents < 0 {
        return Err(ApiError::BadRequest(
            "Price must not be negative".to_string(),
        ));
    }

    let id = req
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let product = Product::new(id, req.name, Money::from_cents(req.price_cents));
    state.catalog.upsert(product.clone());

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /products/{id} — look up a catalog listing.
#[tracing::instrument(skip(state))]
pub async fn show<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog
        .find_product(&ProductId::new(id))
        .await
        .map_err(|e| ApiError::NotFound(e.to_string()))?;
    Ok(Json(product.into()))
}
