//! Customer cart maintenance.

use common::{CartItemId, CustomerId};
use domain::{Cart, CartItem, CartSnapshot, VariantKey};
use store::{CartRepository, CatalogRepository, CheckoutStore};

use crate::error::{CheckoutError, Result};
use crate::loader::CartSnapshotLoader;
use crate::transaction::complete;

/// Adds, updates and removes items in a customer's ACTIVE cart.
pub struct CartService<S: CheckoutStore> {
    store: S,
    loader: CartSnapshotLoader,
}

impl<S: CheckoutStore> CartService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            loader: CartSnapshotLoader::new(),
        }
    }

    /// Returns the customer's ACTIVE cart.
    pub async fn active_cart(&self, customer_id: CustomerId) -> Result<CartSnapshot> {
        let mut tx = self.store.begin().await.map_err(CheckoutError::Transaction)?;
        let result = self.current_snapshot(&mut tx, customer_id).await;
        complete(tx, result).await
    }

    /// Adds `quantity` units of a variant to the customer's ACTIVE cart,
    /// opening a new cart when the customer has none.
    ///
    /// The unit price is captured from the product's discounted price at the
    /// time of the call. Adding a variant already in the cart increases its
    /// quantity and keeps the originally captured price.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        customer_id: CustomerId,
        variant: VariantKey,
        quantity: u32,
    ) -> Result<CartSnapshot> {
        if quantity == 0 {
            return Err(CheckoutError::Validation(
                "Quantity must be greater than zero".to_string(),
            ));
        }

        let mut tx = self.store.begin().await.map_err(CheckoutError::Transaction)?;
        let result = self.add_in(&mut tx, customer_id, variant, quantity).await;
        complete(tx, result).await
    }

    /// Sets the quantity of an item in the customer's ACTIVE cart; zero
    /// removes the item.
    #[tracing::instrument(skip(self))]
    pub async fn set_item_quantity(
        &self,
        customer_id: CustomerId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartSnapshot> {
        let mut tx = self.store.begin().await.map_err(CheckoutError::Transaction)?;
        let result = self.update_in(&mut tx, customer_id, item_id, quantity).await;
        complete(tx, result).await
    }

    async fn add_in(
        &self,
        tx: &mut S::Tx,
        customer_id: CustomerId,
        variant: VariantKey,
        quantity: u32,
    ) -> Result<CartSnapshot> {
        let product = tx
            .get_product(variant.product_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Product", variant.product_id))?;
        if tx.get_variant(variant).await?.is_none() {
            return Err(CheckoutError::not_found("Variant", variant));
        }

        tx.lock_customer_carts(customer_id).await?;
        let cart = match tx.find_active_cart_for_customer(customer_id).await? {
            Some(cart) => cart,
            None => {
                let cart = Cart::new(customer_id);
                tx.insert_cart(&cart).await?;
                tracing::debug!(cart_id = %cart.id, "opened cart");
                cart
            }
        };

        let existing = tx
            .cart_items(cart.id)
            .await?
            .into_iter()
            .find(|item| item.variant == variant);
        match existing {
            Some(item) => {
                let total = item.quantity.checked_add(quantity).ok_or_else(|| {
                    CheckoutError::Validation(format!("Quantity overflow for {variant}"))
                })?;
                tx.update_cart_item_quantity(item.id, total).await?;
            }
            None => {
                let item = CartItem::new(cart.id, variant, quantity, product.effective_unit_price())?;
                tx.insert_cart_item(&item).await?;
            }
        }

        self.current_snapshot(tx, customer_id).await
    }

    async fn update_in(
        &self,
        tx: &mut S::Tx,
        customer_id: CustomerId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartSnapshot> {
        let cart = tx
            .find_active_cart_for_customer(customer_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Cart", customer_id))?;

        let in_cart = tx
            .cart_items(cart.id)
            .await?
            .iter()
            .any(|item| item.id == item_id);
        if !in_cart {
            return Err(CheckoutError::not_found("CartItem", item_id));
        }

        if quantity == 0 {
            tx.delete_cart_item(item_id).await?;
        } else {
            tx.update_cart_item_quantity(item_id, quantity).await?;
        }

        self.current_snapshot(tx, customer_id).await
    }

    async fn current_snapshot(&self, tx: &mut S::Tx, customer_id: CustomerId) -> Result<CartSnapshot> {
        self.loader
            .load_for_customer(tx, customer_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Cart", customer_id))
    }
}

impl<S: CheckoutStore + Clone> Clone for CartService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            loader: self.loader,
        }
    }
}
