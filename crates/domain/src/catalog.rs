//! Catalog entities read by checkout.

use common::{CategoryId, ColorId, ProductId, SellerId, SizeId};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::tax::TaxRate;

/// A specific product + color + size combination, the unit of stock tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantKey {
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub size_id: SizeId,
}

impl VariantKey {
    pub fn new(product_id: ProductId, color_id: ColorId, size_id: SizeId) -> Self {
        Self {
            product_id,
            color_id,
            size_id,
        }
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.product_id, self.color_id, self.size_id)
    }
}

/// A sellable product as seen by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub seller_id: SellerId,
    pub name: String,
    pub sku: String,
    /// List price per unit.
    pub price: Money,
    /// Whole-percent discount applied when the product is added to a cart.
    pub discount_percent: u8,
    /// Associated categories in their stored order. Tax resolution walks them
    /// front to back.
    pub category_ids: Vec<CategoryId>,
}

impl Product {
    /// Unit price after the product's discount, as captured into a cart item.
    pub fn effective_unit_price(&self) -> Money {
        self.price.discounted_by(self.discount_percent)
    }
}

/// Stock level of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub key: VariantKey,
    pub stock_available: u32,
}

/// A node of the category forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `None` marks a root category.
    pub parent_id: Option<CategoryId>,
    pub tax_slab: Option<TaxRate>,
}
