//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use common::CartId;
use domain::{Order, PaymentMethod};
use serde::{Deserialize, Serialize};
use store::CheckoutStore;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::CallerIdentity;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_id: CartId,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
}

/// POST /checkout turns the caller's cart into a pending order.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: CheckoutStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CallerIdentity(customer_id): CallerIdentity,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Json(req) = payload?;
    let order = state
        .checkout
        .checkout(
            req.cart_id,
            customer_id,
            req.payment_method.unwrap_or_default(),
        )
        .await?;
    Ok(Json(CheckoutResponse { order }))
}
