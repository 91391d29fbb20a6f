//! Tunables for the checkout services.

use chrono::Duration;
use domain::{Money, TaxRate};

/// How long reserved stock stays held before the sweeper may reclaim it.
pub const DEFAULT_RESERVATION_TTL_SECS: i64 = 15 * 60;

/// Flat shipping charged per order line, in paise.
pub const DEFAULT_SHIPPING_PER_ITEM_MINOR: i64 = 4000;

/// Applied when no category in a product's chain carries a tax slab.
pub const DEFAULT_TAX_BASIS_POINTS: u32 = 500;

/// Upper bound on parent hops when walking a category chain.
pub const DEFAULT_MAX_CATEGORY_DEPTH: usize = 32;

/// Checkout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub reservation_ttl: Duration,
    pub shipping_per_item: Money,
    pub default_tax_rate: TaxRate,
    pub max_category_depth: usize,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            reservation_ttl: Duration::seconds(DEFAULT_RESERVATION_TTL_SECS),
            shipping_per_item: Money::from_minor(DEFAULT_SHIPPING_PER_ITEM_MINOR),
            default_tax_rate: TaxRate::from_basis_points(DEFAULT_TAX_BASIS_POINTS),
            max_category_depth: DEFAULT_MAX_CATEGORY_DEPTH,
        }
    }
}

/// Settings for the background reservation sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperConfig {
    pub interval: std::time::Duration,
    /// Maximum reservations reclaimed per transaction.
    pub batch_size: usize,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(60),
            batch_size: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.reservation_ttl, Duration::minutes(15));
        assert_eq!(config.shipping_per_item.minor(), 4000);
        assert_eq!(config.default_tax_rate, TaxRate::from_percent(5));
        assert_eq!(config.max_category_depth, 32);
    }
}
