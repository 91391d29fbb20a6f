//! Order lookup and payment outcomes.

use chrono::Utc;
use common::{CustomerId, OrderId};
use domain::{Order, PaymentMethod};
use store::{CheckoutStore, OrderRepository};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::reservation::StockReservationManager;
use crate::transaction::complete;

/// Result reported by the payment gateway for a pending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid { method: Option<PaymentMethod> },
    Failed,
}

/// Reads orders and applies payment outcomes to them.
pub struct OrderService<S: CheckoutStore> {
    store: S,
    reservations: StockReservationManager,
}

impl<S: CheckoutStore> OrderService<S> {
    pub fn new(store: S, config: CheckoutConfig) -> Self {
        Self {
            store,
            reservations: StockReservationManager::new(config.reservation_ttl),
        }
    }

    /// Loads an order placed by `customer_id`.
    ///
    /// Orders placed by other customers are reported as not found.
    pub async fn get_order(&self, order_id: OrderId, customer_id: CustomerId) -> Result<Order> {
        let mut tx = self.store.begin().await.map_err(CheckoutError::Transaction)?;
        let result = tx
            .get_order(order_id)
            .await
            .map_err(CheckoutError::from)
            .and_then(|order| {
                order
                    .filter(|order| order.customer_id == customer_id)
                    .ok_or_else(|| CheckoutError::not_found("Order", order_id))
            });
        complete(tx, result).await
    }

    /// Applies a payment outcome to a pending order.
    ///
    /// A failed payment releases every reservation held by the order so the
    /// stock becomes available again.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment(&self, order_id: OrderId, outcome: PaymentOutcome) -> Result<Order> {
        let mut tx = self.store.begin().await.map_err(CheckoutError::Transaction)?;
        let result = self.apply_outcome(&mut tx, order_id, outcome).await;
        let order = complete(tx, result).await?;

        tracing::info!(status = %order.order_status, is_paid = order.is_paid, "payment recorded");
        Ok(order)
    }

    pub async fn mark_paid(&self, order_id: OrderId, method: Option<PaymentMethod>) -> Result<Order> {
        self.record_payment(order_id, PaymentOutcome::Paid { method })
            .await
    }

    pub async fn mark_failed(&self, order_id: OrderId) -> Result<Order> {
        self.record_payment(order_id, PaymentOutcome::Failed).await
    }

    async fn apply_outcome(
        &self,
        tx: &mut S::Tx,
        order_id: OrderId,
        outcome: PaymentOutcome,
    ) -> Result<Order> {
        let mut order = tx
            .get_order(order_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Order", order_id))?;

        match outcome {
            PaymentOutcome::Paid { method } => order.mark_paid(method)?,
            PaymentOutcome::Failed => {
                order.mark_payment_failed()?;
                let now = Utc::now();
                for reservation_id in order.reservation_ids() {
                    self.reservations.release(tx, reservation_id, now).await?;
                }
            }
        }

        tx.update_order_payment(&order).await?;
        Ok(order)
    }
}

impl<S: CheckoutStore + Clone> Clone for OrderService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            reservations: self.reservations,
        }
    }
}
