use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, CartItemId, CategoryId, CustomerId, OrderId, ProductId, ReservationId};
use domain::{
    Cart, CartItem, CartStatus, Category, Order, Product, ProductVariant, ReservedStock,
    VariantKey,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    Result, StoreError,
    store::{
        CartRepository, CatalogRepository, CheckoutStore, InventoryRepository, OrderRepository,
        StoreTransaction,
    },
};

#[derive(Debug, Clone, Default)]
struct State {
    carts: HashMap<CartId, Cart>,
    /// Kept in insertion order.
    cart_items: Vec<CartItem>,
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    stock: HashMap<VariantKey, u32>,
    reservations: HashMap<ReservationId, ReservedStock>,
    orders: HashMap<OrderId, Order>,
}

impl State {
    fn attached_reservations(&self) -> HashSet<ReservationId> {
        self.orders
            .values()
            .flat_map(|order| order.reservation_ids())
            .collect()
    }
}

/// In-memory store for tests and local runs.
///
/// A transaction takes exclusive ownership of the whole state and works on a
/// private copy, which replaces the shared state only on commit. Transactions
/// are therefore fully serialized, which gives the same no-oversell guarantee
/// as row locking in PostgreSQL.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_on_order_insert: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to reject order inserts, simulating a storage
    /// failure late in checkout.
    pub fn set_fail_on_order_insert(&self, fail: bool) {
        self.fail_on_order_insert.store(fail, Ordering::SeqCst);
    }

    pub async fn put_category(&self, category: Category) {
        self.state
            .lock()
            .await
            .categories
            .insert(category.id, category);
    }

    pub async fn put_product(&self, product: Product) {
        self.state.lock().await.products.insert(product.id, product);
    }

    pub async fn put_variant(&self, variant: ProductVariant) {
        self.state
            .lock()
            .await
            .stock
            .insert(variant.key, variant.stock_available);
    }

    /// Current stock of a variant.
    pub async fn stock(&self, key: VariantKey) -> Option<u32> {
        self.state.lock().await.stock.get(&key).copied()
    }

    /// All reservations, released or not.
    pub async fn reservations(&self) -> Vec<ReservedStock> {
        self.state
            .lock()
            .await
            .reservations
            .values()
            .cloned()
            .collect()
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Overwrites a reservation's expiry, letting tests age reservations.
    pub async fn set_reservation_expiry(&self, reservation_id: ReservationId, at: DateTime<Utc>) {
        if let Some(reservation) = self.state.lock().await.reservations.get_mut(&reservation_id) {
            reservation.expires_at = at;
        }
    }
}

#[async_trait]
impl CheckoutStore for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryTransaction {
            guard,
            staged,
            fail_on_order_insert: self.fail_on_order_insert.load(Ordering::SeqCst),
        })
    }
}

/// Exclusive transaction over an [`InMemoryStore`].
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<State>,
    staged: State,
    fail_on_order_insert: bool,
}

#[async_trait]
impl CartRepository for InMemoryTransaction {
    async fn find_active_cart(&mut self, cart_id: CartId) -> Result<Option<Cart>> {
        Ok(self
            .staged
            .carts
            .get(&cart_id)
            .filter(|cart| cart.is_active())
            .cloned())
    }

    async fn lock_customer_carts(&mut self, _customer_id: CustomerId) -> Result<()> {
        // The transaction already holds the whole state exclusively.
        Ok(())
    }

    async fn find_active_cart_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Cart>> {
        Ok(self
            .staged
            .carts
            .values()
            .find(|cart| cart.customer_id == customer_id && cart.is_active())
            .cloned())
    }

    async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
        self.staged.carts.insert(cart.id, cart.clone());
        Ok(())
    }

    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>> {
        Ok(self
            .staged
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn insert_cart_item(&mut self, item: &CartItem) -> Result<()> {
        if !self.staged.carts.contains_key(&item.cart_id) {
            return Err(StoreError::not_found("Cart", item.cart_id));
        }
        self.staged.cart_items.push(item.clone());
        Ok(())
    }

    async fn update_cart_item_quantity(
        &mut self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<bool> {
        match self
            .staged
            .cart_items
            .iter_mut()
            .find(|item| item.id == item_id)
        {
            Some(item) => {
                item.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_cart_item(&mut self, item_id: CartItemId) -> Result<bool> {
        let before = self.staged.cart_items.len();
        self.staged.cart_items.retain(|item| item.id != item_id);
        Ok(self.staged.cart_items.len() != before)
    }

    async fn mark_cart_checked_out(&mut self, cart_id: CartId) -> Result<bool> {
        match self.staged.carts.get_mut(&cart_id) {
            Some(cart) if cart.is_active() => {
                cart.status = CartStatus::CheckedOut;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryTransaction {
    async fn get_product(&mut self, product_id: ProductId) -> Result<Option<Product>> {
        Ok(self.staged.products.get(&product_id).cloned())
    }

    async fn get_category(&mut self, category_id: CategoryId) -> Result<Option<Category>> {
        Ok(self.staged.categories.get(&category_id).cloned())
    }

    async fn get_variant(&mut self, key: VariantKey) -> Result<Option<ProductVariant>> {
        Ok(self
            .staged
            .stock
            .get(&key)
            .map(|&stock_available| ProductVariant {
                key,
                stock_available,
            }))
    }
}

#[async_trait]
impl InventoryRepository for InMemoryTransaction {
    async fn decrement_stock(&mut self, key: VariantKey, quantity: u32) -> Result<Option<u32>> {
        match self.staged.stock.get_mut(&key) {
            Some(available) if *available >= quantity => {
                *available -= quantity;
                Ok(Some(*available))
            }
            _ => Ok(None),
        }
    }

    async fn increment_stock(&mut self, key: VariantKey, quantity: u32) -> Result<()> {
        let available = self
            .staged
            .stock
            .get_mut(&key)
            .ok_or_else(|| StoreError::not_found("Variant", key))?;
        let current = *available;
        *available = current
            .checked_add(quantity)
            .ok_or_else(|| StoreError::OutOfRange {
                column: "stock_available",
                value: format!("{current} + {quantity}"),
            })?;
        Ok(())
    }

    async fn insert_reservation(&mut self, reservation: &ReservedStock) -> Result<()> {
        self.staged
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn get_reservation(
        &mut self,
        reservation_id: ReservationId,
    ) -> Result<Option<ReservedStock>> {
        Ok(self.staged.reservations.get(&reservation_id).cloned())
    }

    async fn mark_reservation_released(
        &mut self,
        reservation_id: ReservationId,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        match self.staged.reservations.get_mut(&reservation_id) {
            Some(reservation) if !reservation.is_released() => {
                reservation.released_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_reservation(&mut self, reservation_id: ReservationId) -> Result<bool> {
        Ok(self.staged.reservations.remove(&reservation_id).is_some())
    }

    async fn expired_unattached_reservations(
        &mut self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ReservedStock>> {
        let attached = self.staged.attached_reservations();
        let mut expired: Vec<ReservedStock> = self
            .staged
            .reservations
            .values()
            .filter(|r| !r.is_released() && r.is_expired(now) && !attached.contains(&r.id))
            .cloned()
            .collect();
        expired.sort_by_key(|r| r.expires_at);
        expired.truncate(limit);
        Ok(expired)
    }
}

#[async_trait]
impl OrderRepository for InMemoryTransaction {
    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        if self.fail_on_order_insert {
            return Err(StoreError::Unavailable("order insert rejected".to_string()));
        }
        for item in &order.items {
            if !self.staged.reservations.contains_key(&item.reserved_stock_id) {
                return Err(StoreError::not_found("Reservation", item.reserved_stock_id));
            }
        }
        self.staged.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.staged.orders.get(&order_id).cloned())
    }

    async fn update_order_payment(&mut self, order: &Order) -> Result<()> {
        let stored = self
            .staged
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::not_found("Order", order.id))?;
        stored.order_status = order.order_status;
        stored.is_paid = order.is_paid;
        stored.payment_method = order.payment_method;
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn commit(mut self) -> Result<()> {
        *self.guard = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
