//! Shared identifier types for the checkout system.

pub mod types;

pub use types::{
    CartId, CartItemId, CategoryId, ColorId, CustomerId, OrderId, OrderItemId, ProductId,
    ReservationId, SellerId, SizeId,
};
