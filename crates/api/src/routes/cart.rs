//! Cart endpoints for the calling customer.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use common::{CartId, CartItemId, ColorId, CustomerId, ProductId, SizeId};
use domain::{CartSnapshot, CartStatus, Money, VariantKey};
use serde::{Deserialize, Serialize};
use store::CheckoutStore;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::CallerIdentity;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub size_id: SizeId,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub cart: CartView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub customer_id: CustomerId,
    pub status: CartStatus,
    pub items: Vec<CartItemView>,
    pub sub_total: Money,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub size_id: SizeId,
    pub product_name: String,
    #[serde(rename = "productSKU")]
    pub product_sku: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub amount: Money,
}

impl From<CartSnapshot> for CartResponse {
    fn from(snapshot: CartSnapshot) -> Self {
        let sub_total = snapshot.sub_total();
        let items = snapshot
            .lines
            .into_iter()
            .map(|line| CartItemView {
                id: line.item.id,
                product_id: line.item.variant.product_id,
                color_id: line.item.variant.color_id,
                size_id: line.item.variant.size_id,
                amount: line.item.amount(),
                product_name: line.product.name,
                product_sku: line.product.sku,
                quantity: line.item.quantity,
                unit_price: line.item.unit_price,
            })
            .collect();

        CartResponse {
            cart: CartView {
                id: snapshot.cart.id,
                customer_id: snapshot.cart.customer_id,
                status: snapshot.cart.status,
                items,
                sub_total,
            },
        }
    }
}

// -- Handlers --

/// GET /cart returns the caller's ACTIVE cart.
pub async fn get<S: CheckoutStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CallerIdentity(customer_id): CallerIdentity,
) -> Result<Json<CartResponse>, ApiError> {
    let snapshot = state.carts.active_cart(customer_id).await?;
    Ok(Json(snapshot.into()))
}

/// POST /cart/items adds a variant to the caller's cart.
#[tracing::instrument(skip(state, payload))]
pub async fn add_item<S: CheckoutStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CallerIdentity(customer_id): CallerIdentity,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let Json(req) = payload?;
    let variant = VariantKey::new(req.product_id, req.color_id, req.size_id);
    let snapshot = state
        .carts
        .add_item(customer_id, variant, req.quantity)
        .await?;
    Ok(Json(snapshot.into()))
}

/// PUT /cart/items/{id} sets an item's quantity; zero removes it.
#[tracing::instrument(skip(state, item_id, payload))]
pub async fn update_item<S: CheckoutStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CallerIdentity(customer_id): CallerIdentity,
    item_id: Result<Path<CartItemId>, PathRejection>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let Path(item_id) = item_id?;
    let Json(req) = payload?;
    let snapshot = state
        .carts
        .set_item_quantity(customer_id, item_id, req.quantity)
        .await?;
    Ok(Json(snapshot.into()))
}
