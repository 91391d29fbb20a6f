use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, CartItemId, CategoryId, CustomerId, OrderId, ProductId, ReservationId};
use domain::{Cart, CartItem, Category, Order, Product, ProductVariant, ReservedStock, VariantKey};

use crate::Result;

/// Entry point to a storage backend.
///
/// All checkout work happens inside a transaction obtained from [`begin`].
/// Implementations must be thread-safe (Send + Sync) because one store is
/// shared by every request.
///
/// [`begin`]: CheckoutStore::begin
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Transaction type handed out by this store.
    type Tx: StoreTransaction;

    /// Starts a new unit of work.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// Read/write access to carts and their items.
#[async_trait]
pub trait CartRepository: Send {
    /// Loads a cart only if it is still ACTIVE.
    ///
    /// Backends lock the cart row for the rest of the transaction so two
    /// checkouts of the same cart cannot both proceed.
    async fn find_active_cart(&mut self, cart_id: CartId) -> Result<Option<Cart>>;

    /// Serializes cart creation for a customer until the transaction ends.
    ///
    /// Callers that may open a new cart take this lock before looking up the
    /// ACTIVE one, so concurrent first adds cannot both create a cart.
    async fn lock_customer_carts(&mut self, customer_id: CustomerId) -> Result<()>;

    /// Loads the customer's ACTIVE cart, if any.
    async fn find_active_cart_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Cart>>;

    async fn insert_cart(&mut self, cart: &Cart) -> Result<()>;

    /// Items of a cart in the order they were added.
    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>>;

    async fn insert_cart_item(&mut self, item: &CartItem) -> Result<()>;

    /// Returns false if the item does not exist.
    async fn update_cart_item_quantity(
        &mut self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<bool>;

    /// Returns false if the item does not exist.
    async fn delete_cart_item(&mut self, item_id: CartItemId) -> Result<bool>;

    /// Moves an ACTIVE cart to CHECKED_OUT.
    ///
    /// Returns false if the cart was not ACTIVE.
    async fn mark_cart_checked_out(&mut self, cart_id: CartId) -> Result<bool>;
}

/// Read access to the catalog.
#[async_trait]
pub trait CatalogRepository: Send {
    /// Loads a product together with its ordered category ids.
    async fn get_product(&mut self, product_id: ProductId) -> Result<Option<Product>>;

    async fn get_category(&mut self, category_id: CategoryId) -> Result<Option<Category>>;

    async fn get_variant(&mut self, key: VariantKey) -> Result<Option<ProductVariant>>;
}

/// Variant stock counters and reservations.
#[async_trait]
pub trait InventoryRepository: Send {
    /// Decrements a variant's stock if, and only if, it holds at least
    /// `quantity` units. The check and the write are a single atomic step.
    ///
    /// Returns the remaining stock, or `None` when the variant does not exist
    /// or has too little stock (in which case nothing changed).
    async fn decrement_stock(&mut self, key: VariantKey, quantity: u32) -> Result<Option<u32>>;

    /// Credits units back to a variant.
    async fn increment_stock(&mut self, key: VariantKey, quantity: u32) -> Result<()>;

    async fn insert_reservation(&mut self, reservation: &ReservedStock) -> Result<()>;

    async fn get_reservation(
        &mut self,
        reservation_id: ReservationId,
    ) -> Result<Option<ReservedStock>>;

    /// Flags a reservation as released. Returns false if it was already
    /// released or does not exist.
    async fn mark_reservation_released(
        &mut self,
        reservation_id: ReservationId,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Returns false if the reservation does not exist.
    async fn delete_reservation(&mut self, reservation_id: ReservationId) -> Result<bool>;

    /// Unreleased reservations that expired before `now` and are not
    /// referenced by any order item, oldest first.
    async fn expired_unattached_reservations(
        &mut self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ReservedStock>>;
}

/// Orders and their items.
#[async_trait]
pub trait OrderRepository: Send {
    /// Inserts an order together with all of its items.
    async fn insert_order(&mut self, order: &Order) -> Result<()>;

    /// Loads an order with its items.
    async fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>>;

    /// Persists the payment-related fields (status, paid flag, method).
    async fn update_order_payment(&mut self, order: &Order) -> Result<()>;
}

/// A unit of work spanning every repository.
///
/// Dropping a transaction without calling [`commit`] discards all of its
/// writes.
///
/// [`commit`]: StoreTransaction::commit
#[async_trait]
pub trait StoreTransaction:
    CartRepository + CatalogRepository + InventoryRepository + OrderRepository + Send
{
    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}
