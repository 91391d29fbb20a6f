//! Background reclamation of abandoned reservations.

use chrono::{DateTime, Utc};
use store::{CheckoutStore, InventoryRepository};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::{CheckoutConfig, SweeperConfig};
use crate::error::{CheckoutError, Result};
use crate::reservation::StockReservationManager;
use crate::transaction::complete;

const MIN_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Returns stock held by expired reservations that never became part of an
/// order.
pub struct ReservationSweeper<S: CheckoutStore> {
    store: S,
    reservations: StockReservationManager,
    config: SweeperConfig,
}

impl<S: CheckoutStore> ReservationSweeper<S> {
    pub fn new(store: S, checkout: CheckoutConfig, config: SweeperConfig) -> Self {
        Self {
            store,
            reservations: StockReservationManager::new(checkout.reservation_ttl),
            config,
        }
    }

    /// Reclaims every reservation that expired before `now` and is not
    /// referenced by an order. Returns how many were reclaimed.
    ///
    /// Work is committed in batches of the configured size.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut swept = 0;
        loop {
            let mut tx = self.store.begin().await.map_err(CheckoutError::Transaction)?;
            let result = self.sweep_batch(&mut tx, now).await;
            let batch = complete(tx, result).await?;
            swept += batch;
            if batch == 0 || batch < self.config.batch_size {
                break;
            }
        }

        if swept > 0 {
            metrics::counter!("reservations_swept_total").increment(swept as u64);
            tracing::info!(swept, "reclaimed expired reservations");
        }
        Ok(swept)
    }

    async fn sweep_batch(&self, tx: &mut S::Tx, now: DateTime<Utc>) -> Result<usize> {
        let expired = tx
            .expired_unattached_reservations(now, self.config.batch_size)
            .await?;
        for reservation in &expired {
            self.reservations.reclaim(tx, reservation).await?;
        }
        Ok(expired.len())
    }

    /// Sweeps on a fixed interval until `shutdown` flips to true or its
    /// sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.config.interval.max(MIN_INTERVAL);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(?interval, "reservation sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep(Utc::now()).await {
                        tracing::error!(error = %err, "reservation sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("reservation sweeper stopped");
    }
}
