//! Stock reservation and release.

use chrono::{DateTime, Duration, Utc};
use common::ReservationId;
use domain::{ReservedStock, VariantKey};
use store::{InventoryRepository, StoreError};

use crate::error::{CheckoutError, Result};

/// Moves units between a variant's available stock and reservations.
#[derive(Debug, Clone, Copy)]
pub struct StockReservationManager {
    ttl: Duration,
}

impl StockReservationManager {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Takes `quantity` units out of a variant's stock and records a
    /// reservation that expires after the configured TTL.
    ///
    /// Fails with [`CheckoutError::InsufficientStock`] when the variant is
    /// unknown or holds fewer units, leaving stock untouched.
    pub async fn reserve<I>(
        &self,
        inventory: &mut I,
        variant: VariantKey,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<ReservedStock>
    where
        I: InventoryRepository + ?Sized,
    {
        if quantity == 0 {
            return Err(CheckoutError::Validation(format!(
                "Cannot reserve zero units of {variant}"
            )));
        }

        let Some(remaining) = inventory.decrement_stock(variant, quantity).await? else {
            return Err(CheckoutError::InsufficientStock {
                variant,
                requested: quantity,
            });
        };

        let reservation = ReservedStock::new(variant, quantity, now, self.ttl);
        inventory.insert_reservation(&reservation).await?;

        metrics::counter!("stock_reservations_total").increment(1);
        tracing::debug!(%variant, quantity, remaining, reservation_id = %reservation.id, "stock reserved");
        Ok(reservation)
    }

    /// Credits a reservation's units back to stock and marks it released.
    ///
    /// The reservation row is kept because order items may still reference
    /// it. Returns false if it had already been released.
    pub async fn release<I>(
        &self,
        inventory: &mut I,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> Result<bool>
    where
        I: InventoryRepository + ?Sized,
    {
        let reservation = inventory
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Reservation", reservation_id))?;

        if !inventory.mark_reservation_released(reservation_id, now).await? {
            return Ok(false);
        }
        inventory
            .increment_stock(reservation.variant, reservation.quantity)
            .await?;

        tracing::debug!(%reservation_id, quantity = reservation.quantity, "reservation released");
        Ok(true)
    }

    /// Credits an abandoned reservation back to stock and deletes it.
    ///
    /// A reservation whose variant no longer exists is deleted without
    /// crediting anything.
    pub async fn reclaim<I>(&self, inventory: &mut I, reservation: &ReservedStock) -> Result<()>
    where
        I: InventoryRepository + ?Sized,
    {
        match inventory
            .increment_stock(reservation.variant, reservation.quantity)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    variant = %reservation.variant,
                    "variant of expired reservation no longer exists, dropping reservation"
                );
            }
            Err(err) => return Err(err.into()),
        }
        inventory.delete_reservation(reservation.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ColorId, ProductId, SizeId};
    use domain::ProductVariant;
    use store::{CheckoutStore, InMemoryStore, StoreTransaction};

    use crate::error::ErrorKind;

    async fn store_with_stock(stock: u32) -> (InMemoryStore, VariantKey) {
        let store = InMemoryStore::new();
        let key = VariantKey::new(ProductId::new(), ColorId::new(), SizeId::new());
        store
            .put_variant(ProductVariant {
                key,
                stock_available: stock,
            })
            .await;
        (store, key)
    }

    fn manager() -> StockReservationManager {
        StockReservationManager::new(Duration::minutes(15))
    }

    #[tokio::test]
    async fn test_reserve_decrements_and_records() {
        let (store, key) = store_with_stock(5).await;
        let now = Utc::now();

        let mut tx = store.begin().await.unwrap();
        let reservation = manager().reserve(&mut tx, key, 3, now).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(reservation.quantity, 3);
        assert_eq!(reservation.expires_at, now + Duration::minutes(15));
        assert_eq!(store.stock(key).await, Some(2));
        assert_eq!(store.reservations().await, vec![reservation]);
    }

    #[tokio::test]
    async fn test_reserve_exact_stock() {
        let (store, key) = store_with_stock(3).await;
        let mut tx = store.begin().await.unwrap();
        manager().reserve(&mut tx, key, 3, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.stock(key).await, Some(0));
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_stock_untouched() {
        let (store, key) = store_with_stock(2).await;
        let mut tx = store.begin().await.unwrap();
        let err = manager().reserve(&mut tx, key, 3, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        tx.commit().await.unwrap();

        assert_eq!(store.stock(key).await, Some(2));
        assert!(store.reservations().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_variant_is_insufficient_stock() {
        let store = InMemoryStore::new();
        let key = VariantKey::new(ProductId::new(), ColorId::new(), SizeId::new());
        let mut tx = store.begin().await.unwrap();
        let err = manager().reserve(&mut tx, key, 1, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let (store, key) = store_with_stock(2).await;
        let mut tx = store.begin().await.unwrap();
        let err = manager().reserve(&mut tx, key, 0, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }

    #[tokio::test]
    async fn test_release_credits_stock_once() {
        let (store, key) = store_with_stock(5).await;
        let mut tx = store.begin().await.unwrap();
        let reservation = manager().reserve(&mut tx, key, 4, Utc::now()).await.unwrap();

        assert!(manager().release(&mut tx, reservation.id, Utc::now()).await.unwrap());
        assert!(!manager().release(&mut tx, reservation.id, Utc::now()).await.unwrap());
        tx.commit().await.unwrap();

        assert_eq!(store.stock(key).await, Some(5));
        assert!(store.reservations().await[0].is_released());
    }

    #[tokio::test]
    async fn test_reclaim_deletes_reservation() {
        let (store, key) = store_with_stock(5).await;
        let mut tx = store.begin().await.unwrap();
        let reservation = manager().reserve(&mut tx, key, 2, Utc::now()).await.unwrap();
        manager().reclaim(&mut tx, &reservation).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.stock(key).await, Some(5));
        assert!(store.reservations().await.is_empty());
    }

    #[tokio::test]
    async fn test_reclaim_drops_reservation_of_deleted_variant() {
        let store = InMemoryStore::new();
        let gone = VariantKey::new(ProductId::new(), ColorId::new(), SizeId::new());
        let orphan = ReservedStock::new(gone, 2, Utc::now(), Duration::minutes(15));

        let mut tx = store.begin().await.unwrap();
        tx.insert_reservation(&orphan).await.unwrap();
        manager().reclaim(&mut tx, &orphan).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.stock(gone).await, None);
        assert!(store.reservations().await.is_empty());
    }
}
