//! Checkout error types.

use common::CartId;
use domain::{DomainError, VariantKey};
use serde::Serialize;
use store::StoreError;
use thiserror::Error;

/// Stable, machine-readable error categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    EmptyCart,
    InsufficientStock,
    ValidationFailure,
    TransactionFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not_found",
            ErrorKind::EmptyCart => "empty_cart",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::ValidationFailure => "validation_failure",
            ErrorKind::TransactionFailure => "transaction_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during checkout and the operations around it.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A cart, product, order or other entity does not exist (or is not
    /// visible to the caller).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The active cart has no items.
    #[error("Cart {0} has no items")]
    EmptyCart(CartId),

    /// A variant is missing or holds fewer units than requested.
    #[error("Insufficient stock for variant {variant}: requested {requested}")]
    InsufficientStock { variant: VariantKey, requested: u32 },

    /// The request itself is malformed or violates a domain rule.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The storage backend failed or refused to commit.
    #[error("Transaction failed: {0}")]
    Transaction(#[source] StoreError),
}

impl CheckoutError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CheckoutError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::NotFound { .. } => ErrorKind::NotFound,
            CheckoutError::EmptyCart(_) => ErrorKind::EmptyCart,
            CheckoutError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CheckoutError::Validation(_) => ErrorKind::ValidationFailure,
            CheckoutError::Transaction(_) => ErrorKind::TransactionFailure,
        }
    }
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => CheckoutError::NotFound { entity, id },
            other => CheckoutError::Transaction(other),
        }
    }
}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        CheckoutError::Validation(err.to_string())
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
