//! Carts and the snapshot checkout works from.

use common::{CartId, CartItemId, CustomerId};
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, VariantKey};
use crate::error::DomainError;
use crate::money::Money;

/// Lifecycle of a cart.
///
/// ```text
/// Active ──► CheckedOut   (terminal, irreversible)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    #[default]
    Active,
    CheckedOut,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "ACTIVE",
            CartStatus::CheckedOut => "CHECKED_OUT",
        }
    }

    /// Parses the persisted representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(CartStatus::Active),
            "CHECKED_OUT" => Some(CartStatus::CheckedOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
    pub status: CartStatus,
}

impl Cart {
    /// Creates a new active cart for a customer.
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            id: CartId::new(),
            customer_id,
            status: CartStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CartStatus::Active
    }
}

/// One line of a cart, bound to a specific variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub variant: VariantKey,
    pub quantity: u32,
    /// Unit price captured when the item was added.
    pub unit_price: Money,
}

impl CartItem {
    /// Creates a cart item, rejecting non-positive quantities.
    pub fn new(
        cart_id: CartId,
        variant: VariantKey,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        Ok(Self {
            id: CartItemId::new(),
            cart_id,
            variant,
            quantity,
            unit_price,
        })
    }

    /// Price of the whole line before tax and shipping, clamped at the
    /// representable bounds.
    pub fn amount(&self) -> Money {
        self.unit_price.saturating_multiply(self.quantity)
    }
}

/// A cart item together with the product it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

/// An active cart and all of its lines, read in one consistent pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line amounts before tax and shipping.
    pub fn sub_total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc.saturating_add(line.item.amount()))
    }
}
