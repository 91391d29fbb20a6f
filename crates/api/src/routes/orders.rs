//! Order lookup and payment callback endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use checkout::PaymentOutcome;
use common::OrderId;
use domain::{Order, PaymentMethod};
use serde::{Deserialize, Serialize};
use store::CheckoutStore;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::CallerIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Failed,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// GET /orders/{id} returns one of the caller's orders.
pub async fn get<S: CheckoutStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CallerIdentity(customer_id): CallerIdentity,
    order_id: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Path(order_id) = order_id?;
    let order = state.orders.get_order(order_id, customer_id).await?;
    Ok(Json(OrderResponse { order }))
}

/// POST /orders/{id}/payment records the payment gateway's verdict.
///
/// Called by the payment integration rather than by customers, so no
/// caller identity is required.
#[tracing::instrument(skip(state, order_id, payload))]
pub async fn record_payment<S: CheckoutStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    order_id: Result<Path<OrderId>, PathRejection>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Path(order_id) = order_id?;
    let Json(req) = payload?;
    let outcome = match req.status {
        PaymentStatus::Paid => PaymentOutcome::Paid {
            method: req.payment_method,
        },
        PaymentStatus::Failed => PaymentOutcome::Failed,
    };
    let order = state.orders.record_payment(order_id, outcome).await?;
    Ok(Json(OrderResponse { order }))
}
