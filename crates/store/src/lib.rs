//! Transactional persistence for the checkout core.
//!
//! Every read and write checkout performs goes through a [`StoreTransaction`],
//! so stock decrements, reservations, the order insert and the cart status
//! change either commit together or not at all.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryStore, InMemoryTransaction};
pub use postgres::{PostgresStore, PostgresTransaction};
pub use store::{
    CartRepository, CatalogRepository, CheckoutStore, InventoryRepository, OrderRepository,
    StoreTransaction,
};
