//! Loads a customer's cart together with its product data.

use common::{CartId, CustomerId};
use domain::{CartLine, CartSnapshot};
use store::{CartRepository, CatalogRepository};

use crate::error::{CheckoutError, Result};

/// Builds [`CartSnapshot`]s from storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartSnapshotLoader;

impl CartSnapshotLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads an ACTIVE cart that belongs to `customer_id` and has at least
    /// one item.
    ///
    /// A cart that is missing, already checked out, or owned by another
    /// customer is reported as not found.
    pub async fn load<T>(
        &self,
        tx: &mut T,
        cart_id: CartId,
        customer_id: CustomerId,
    ) -> Result<CartSnapshot>
    where
        T: CartRepository + CatalogRepository + ?Sized,
    {
        let cart = tx
            .find_active_cart(cart_id)
            .await?
            .filter(|cart| cart.customer_id == customer_id)
            .ok_or_else(|| CheckoutError::not_found("Cart", cart_id))?;

        let snapshot = self.with_lines(tx, cart).await?;
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart(cart_id));
        }
        Ok(snapshot)
    }

    /// Loads the customer's ACTIVE cart, which may be empty.
    pub async fn load_for_customer<T>(
        &self,
        tx: &mut T,
        customer_id: CustomerId,
    ) -> Result<Option<CartSnapshot>>
    where
        T: CartRepository + CatalogRepository + ?Sized,
    {
        match tx.find_active_cart_for_customer(customer_id).await? {
            Some(cart) => Ok(Some(self.with_lines(tx, cart).await?)),
            None => Ok(None),
        }
    }

    async fn with_lines<T>(&self, tx: &mut T, cart: domain::Cart) -> Result<CartSnapshot>
    where
        T: CartRepository + CatalogRepository + ?Sized,
    {
        let items = tx.cart_items(cart.id).await?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product_id = item.variant.product_id;
            let product = tx
                .get_product(product_id)
                .await?
                .ok_or_else(|| CheckoutError::not_found("Product", product_id))?;
            lines.push(CartLine { item, product });
        }
        Ok(CartSnapshot { cart, lines })
    }
}
