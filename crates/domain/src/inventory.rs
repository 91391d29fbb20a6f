//! Time-boxed stock reservations.

use chrono::{DateTime, Duration, Utc};
use common::ReservationId;
use serde::{Deserialize, Serialize};

use crate::catalog::VariantKey;

/// A temporary hold on variant stock created during checkout.
///
/// Once its order commits, the reservation is referenced by exactly one order
/// item. Reservations that expire without an order are reclaimed by the sweeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedStock {
    pub id: ReservationId,
    pub variant: VariantKey,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set when the held stock has been credited back to the variant.
    pub released_at: Option<DateTime<Utc>>,
}

impl ReservedStock {
    /// Creates a reservation that expires `ttl` after `now`.
    pub fn new(variant: VariantKey, quantity: u32, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: ReservationId::new(),
            variant,
            quantity,
            created_at: now,
            expires_at: now + ttl,
            released_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_released(&self) -> bool {
        self.released_at.is_some()
    }
}
