//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use checkout::config::{
    DEFAULT_MAX_CATEGORY_DEPTH, DEFAULT_RESERVATION_TTL_SECS, DEFAULT_SHIPPING_PER_ITEM_MINOR,
    DEFAULT_TAX_BASIS_POINTS,
};
use checkout::{CheckoutConfig, SweeperConfig};
use domain::{Money, TaxRate};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `"json"` for structured logs, anything else for text
/// - `DATABASE_URL`: PostgreSQL connection string; unset runs on the
///   in-memory store
/// - `DATABASE_MAX_CONNECTIONS` (default: `10`)
/// - `RESERVATION_TTL_SECS` (default: `900`)
/// - `SHIPPING_PER_ITEM_MINOR` (default: `4000`)
/// - `DEFAULT_TAX_BASIS_POINTS` (default: `500`)
/// - `MAX_CATEGORY_DEPTH` (default: `32`)
/// - `SWEEP_INTERVAL_SECS` (default: `60`, minimum: `1`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub json_logs: bool,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub checkout: CheckoutConfig,
    pub sweeper: SweeperConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            json_logs: std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json"),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            database_max_connections: env_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            checkout: CheckoutConfig {
                reservation_ttl: chrono::Duration::seconds(env_or(
                    "RESERVATION_TTL_SECS",
                    DEFAULT_RESERVATION_TTL_SECS,
                )),
                shipping_per_item: Money::from_minor(env_or(
                    "SHIPPING_PER_ITEM_MINOR",
                    DEFAULT_SHIPPING_PER_ITEM_MINOR,
                )),
                default_tax_rate: TaxRate::from_basis_points(env_or(
                    "DEFAULT_TAX_BASIS_POINTS",
                    DEFAULT_TAX_BASIS_POINTS,
                )),
                max_category_depth: env_or("MAX_CATEGORY_DEPTH", DEFAULT_MAX_CATEGORY_DEPTH),
            },
            sweeper: SweeperConfig {
                interval: sweep_interval(env_or(
                    "SWEEP_INTERVAL_SECS",
                    defaults.sweeper.interval.as_secs(),
                )),
                ..defaults.sweeper
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            json_logs: false,
            database_url: None,
            database_max_connections: 10,
            checkout: CheckoutConfig::default(),
            sweeper: SweeperConfig::default(),
        }
    }
}

/// Zero would make the sweeper's ticker panic, so it is raised to one second.
fn sweep_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.checkout.reservation_ttl, chrono::Duration::minutes(15));
        assert_eq!(config.checkout.shipping_per_item.minor(), 4000);
        assert_eq!(config.checkout.default_tax_rate.basis_points(), 500);
        assert_eq!(config.sweeper.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_zero_sweep_interval_is_raised() {
        assert_eq!(sweep_interval(0), Duration::from_secs(1));
        assert_eq!(sweep_interval(30), Duration::from_secs(30));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("CHECKOUT_TEST_UNSET_VARIABLE", 42u32), 42);
    }
}
