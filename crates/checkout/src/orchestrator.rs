//! Checkout orchestration.

use std::time::Instant;

use chrono::{DateTime, Utc};
use common::{CartId, CustomerId, OrderItemId, ReservationId};
use domain::{CartSnapshot, LineCharge, Order, OrderItem, OrderTotals, PaymentMethod};
use store::{CartRepository, CheckoutStore, OrderRepository};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::loader::CartSnapshotLoader;
use crate::reservation::StockReservationManager;
use crate::tax::CategoryTaxResolver;
use crate::transaction::complete;

/// Turns an ACTIVE cart into a pending order.
///
/// The whole checkout runs in one store transaction: loading the cart,
/// reserving stock for every line, inserting the order and closing the cart
/// either all commit together or none of it is visible. A failure on any
/// line leaves stock and reservations exactly as they were.
pub struct CheckoutOrchestrator<S: CheckoutStore> {
    store: S,
    config: CheckoutConfig,
    loader: CartSnapshotLoader,
    tax: CategoryTaxResolver,
    reservations: StockReservationManager,
}

impl<S: CheckoutStore> CheckoutOrchestrator<S> {
    pub fn new(store: S, config: CheckoutConfig) -> Self {
        Self {
            store,
            loader: CartSnapshotLoader::new(),
            tax: CategoryTaxResolver::new(config.max_category_depth),
            reservations: StockReservationManager::new(config.reservation_ttl),
            config,
        }
    }

    /// Checks out `cart_id` on behalf of `customer_id`.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(
        &self,
        cart_id: CartId,
        customer_id: CustomerId,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = Instant::now();

        let result = self
            .checkout_in_transaction(cart_id, customer_id, payment_method)
            .await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(order) => {
                metrics::counter!("checkout_completed_total").increment(1);
                tracing::info!(
                    order_id = %order.id,
                    items = order.items.len(),
                    total = %order.total,
                    "checkout completed"
                );
            }
            Err(err) => {
                metrics::counter!("checkout_failed_total", "kind" => err.kind().as_str())
                    .increment(1);
                tracing::warn!(kind = %err.kind(), error = %err, "checkout failed");
            }
        }
        result
    }

    async fn checkout_in_transaction(
        &self,
        cart_id: CartId,
        customer_id: CustomerId,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        let mut tx = self.store.begin().await.map_err(CheckoutError::Transaction)?;
        let result = self
            .place_order(&mut tx, cart_id, customer_id, payment_method, Utc::now())
            .await;
        complete(tx, result).await
    }

    async fn place_order(
        &self,
        tx: &mut S::Tx,
        cart_id: CartId,
        customer_id: CustomerId,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        let snapshot = self.loader.load(tx, cart_id, customer_id).await?;
        let reserved = self.reserve_lines(tx, &snapshot, now).await?;

        let mut charges = Vec::with_capacity(snapshot.lines.len());
        for line in &snapshot.lines {
            let rate = self
                .tax
                .resolve_for_product(tx, &line.product)
                .await?
                .unwrap_or(self.config.default_tax_rate);
            charges.push(LineCharge::compute(
                line.item.unit_price,
                line.item.quantity,
                rate,
                self.config.shipping_per_item,
            )?);
        }

        let totals = OrderTotals::from_lines(&charges)?;
        let mut order = Order::pending(customer_id, payment_method, totals, now);
        order.items = snapshot
            .lines
            .iter()
            .zip(&charges)
            .zip(reserved)
            .map(|((line, charge), reserved_stock_id)| OrderItem {
                id: OrderItemId::new(),
                order_id: order.id,
                variant: line.item.variant,
                seller_id: line.product.seller_id,
                quantity: line.item.quantity,
                unit_price: line.item.unit_price,
                total_price: charge.amount,
                tax: charge.tax,
                product_name: line.product.name.clone(),
                product_sku: line.product.sku.clone(),
                reserved_stock_id,
            })
            .collect();

        tx.insert_order(&order).await?;
        if !tx.mark_cart_checked_out(cart_id).await? {
            return Err(CheckoutError::not_found("Cart", cart_id));
        }
        Ok(order)
    }

    /// Reserves stock for every line and returns the reservation ids in line
    /// order.
    ///
    /// Variants are locked in key order so two checkouts sharing variants
    /// always acquire row locks in the same sequence.
    async fn reserve_lines(
        &self,
        tx: &mut S::Tx,
        snapshot: &CartSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReservationId>> {
        let mut by_variant: Vec<usize> = (0..snapshot.lines.len()).collect();
        by_variant.sort_by_key(|&index| snapshot.lines[index].item.variant);

        let mut reserved = Vec::with_capacity(by_variant.len());
        for index in by_variant {
            let item = &snapshot.lines[index].item;
            let reservation = self
                .reservations
                .reserve(tx, item.variant, item.quantity, now)
                .await?;
            reserved.push((index, reservation.id));
        }

        reserved.sort_by_key(|&(index, _)| index);
        Ok(reserved.into_iter().map(|(_, id)| id).collect())
    }
}

impl<S: CheckoutStore + Clone> Clone for CheckoutOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config,
            loader: self.loader,
            tax: self.tax,
            reservations: self.reservations,
        }
    }
}
