//! Domain error types.

use thiserror::Error;

use crate::order::OrderStatus;

/// Errors raised by domain invariants, independent of any storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Quantity must be a positive integer.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// A price calculation does not fit in a money amount.
    #[error("Amount out of range while computing {what}")]
    AmountOverflow { what: &'static str },

    /// The order is not in a state that allows the requested action.
    #[error("Invalid order transition: cannot {action} from {current} state")]
    InvalidOrderTransition {
        current: OrderStatus,
        action: &'static str,
    },
}
