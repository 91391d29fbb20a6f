//! Order status machine.

use serde::{Deserialize, Serialize};

/// The state of an order after checkout.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Confirmed       (payment succeeded)
///           └──► PaymentFailed   (payment failed, stock released)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order placed, awaiting the payment outcome.
    #[default]
    Pending,

    /// Payment confirmed (terminal for this core).
    Confirmed,

    /// Payment failed and the order's reservations were released (terminal).
    PaymentFailed,
}

impl OrderStatus {
    /// Returns true if a payment outcome can still be recorded.
    pub fn can_record_payment(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::PaymentFailed => "PaymentFailed",
        }
    }

    /// Parses the persisted representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Confirmed" => Some(OrderStatus::Confirmed),
            "PaymentFailed" => Some(OrderStatus::PaymentFailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
