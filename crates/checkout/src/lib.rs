//! Checkout core for the marketplace.
//!
//! Turns a customer's ACTIVE cart into a pending order in a single store
//! transaction:
//! 1. Load the cart with its products
//! 2. Reserve stock for every line
//! 3. Resolve tax slabs and price each line
//! 4. Insert the order and close the cart
//!
//! Any failure before commit leaves stock, reservations and the cart as they
//! were. Reservations whose order never materialises are reclaimed by the
//! [`ReservationSweeper`].

pub mod cart;
pub mod config;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod orders;
pub mod reservation;
pub mod sweeper;
pub mod tax;
mod transaction;

pub use cart::CartService;
pub use config::{CheckoutConfig, SweeperConfig};
pub use error::{CheckoutError, ErrorKind, Result};
pub use loader::CartSnapshotLoader;
pub use orchestrator::CheckoutOrchestrator;
pub use orders::{OrderService, PaymentOutcome};
pub use reservation::StockReservationManager;
pub use sweeper::ReservationSweeper;
pub use tax::CategoryTaxResolver;
