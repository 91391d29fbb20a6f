//! Domain layer for the marketplace checkout.
//!
//! This crate holds the pure business model with no I/O:
//! - Money and tax-rate arithmetic in currency minor units
//! - Carts, cart items and the cart snapshot consumed by checkout
//! - Catalog entities (products, variants, categories)
//! - Time-boxed stock reservations
//! - Orders, their status machine and per-line pricing

pub mod cart;
pub mod catalog;
pub mod error;
pub mod inventory;
pub mod money;
pub mod order;
pub mod tax;

pub use cart::{Cart, CartItem, CartLine, CartSnapshot, CartStatus};
pub use catalog::{Category, Product, ProductVariant, VariantKey};
pub use error::DomainError;
pub use inventory::ReservedStock;
pub use money::Money;
pub use order::{LineCharge, Order, OrderItem, OrderStatus, OrderTotals, PaymentMethod};
pub use tax::TaxRate;
