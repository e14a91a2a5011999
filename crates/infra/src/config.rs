//! Configuration loading and representation.
//!
//! Everything comes from environment variables. `from_lookup` takes any key
//! lookup so tests never touch the process environment.

use std::net::SocketAddr;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use cardstock_core::CurrencyCode;
use cardstock_listings::ListingPolicy;
use cardstock_pricing::PricingPolicy;

pub const BIND_ADDR: &str = "CARDSTOCK_BIND_ADDR";
pub const USE_PERSISTENT_STORES: &str = "USE_PERSISTENT_STORES";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const PRICING_DEFAULT_MARKUP: &str = "PRICING_DEFAULT_MARKUP";
pub const PRICING_FLOOR: &str = "PRICING_FLOOR";
pub const CURRENCY: &str = "CARDSTOCK_CURRENCY";
pub const LISTINGS_MARK_ITEMS_LISTED: &str = "LISTINGS_MARK_ITEMS_LISTED";
pub const SEED_DEV_DATA: &str = "CARDSTOCK_SEED_DEV_DATA";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where the service keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub pricing: PricingPolicy,
    pub listings: ListingPolicy,
    pub seed_dev_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(BIND_ADDR, get(BIND_ADDR), || {
            DEFAULT_BIND_ADDR.parse().map_err(|e| format!("{e}"))
        })?;

        let storage = if parse_bool(USE_PERSISTENT_STORES, get(USE_PERSISTENT_STORES), false)? {
            let database_url = get(DATABASE_URL).ok_or(ConfigError::Missing(DATABASE_URL))?;
            let max_connections = parse_or(
                DATABASE_MAX_CONNECTIONS,
                get(DATABASE_MAX_CONNECTIONS),
                || Ok(DEFAULT_MAX_CONNECTIONS),
            )?;
            if max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: DATABASE_MAX_CONNECTIONS,
                    reason: "must be at least 1".to_string(),
                });
            }
            StorageConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StorageConfig::InMemory
        };

        let defaults = PricingPolicy::default();
        let markup: Decimal = parse_or(PRICING_DEFAULT_MARKUP, get(PRICING_DEFAULT_MARKUP), || {
            Ok(defaults.markup())
        })?;
        let floor: Decimal = parse_or(PRICING_FLOOR, get(PRICING_FLOOR), || Ok(defaults.floor()))?;
        let currency = match get(CURRENCY) {
            Some(raw) => CurrencyCode::parse(&raw).map_err(|e| ConfigError::Invalid {
                var: CURRENCY,
                reason: e.to_string(),
            })?,
            None => CurrencyCode::cad(),
        };

        let pricing = PricingPolicy::new(markup, floor, currency.clone()).map_err(|e| {
            ConfigError::Invalid {
                var: if markup <= Decimal::ZERO || markup > PricingPolicy::MAX_MARKUP {
                    PRICING_DEFAULT_MARKUP
                } else {
                    PRICING_FLOOR
                },
                reason: e.to_string(),
            }
        })?;

        let listings = ListingPolicy {
            default_currency: currency,
            mark_items_listed: parse_bool(
                LISTINGS_MARK_ITEMS_LISTED,
                get(LISTINGS_MARK_ITEMS_LISTED),
                false,
            )?,
        };

        let seed_dev_data = parse_bool(SEED_DEV_DATA, get(SEED_DEV_DATA), false)?;

        Ok(Self {
            bind_addr,
            storage,
            pricing,
            listings,
            seed_dev_data,
        })
    }
}

impl Default for AppConfig {
    /// In-memory storage with default pricing and listing policies.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage: StorageConfig::InMemory,
            pricing: PricingPolicy::default(),
            listings: ListingPolicy::default(),
            seed_dev_data: false,
        }
    }
}

fn parse_or<T, D>(var: &'static str, raw: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: FnOnce() -> Result<T, String>,
{
    match raw {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("'{raw}': {e}"),
        }),
        None => default().map_err(|reason| ConfigError::Invalid { var, reason }),
    }
}

fn parse_bool(var: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                reason: format!("'{v}' is not a boolean"),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use rust_decimal_macros::dec;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.pricing.markup(), dec!(1.5));
        assert_eq!(cfg.pricing.floor(), dec!(1.0));
        assert_eq!(cfg.listings.default_currency.as_str(), "CAD");
        assert!(!cfg.listings.mark_items_listed);
    }

    #[test]
    fn pricing_and_listing_settings_are_read() {
        let cfg = config(&[
            (PRICING_DEFAULT_MARKUP, "2.25"),
            (PRICING_FLOOR, "0.50"),
            (CURRENCY, "usd"),
            (LISTINGS_MARK_ITEMS_LISTED, "true"),
            (SEED_DEV_DATA, "1"),
        ])
        .unwrap();

        assert_eq!(cfg.pricing.markup(), dec!(2.25));
        assert_eq!(cfg.pricing.floor(), dec!(0.50));
        assert_eq!(cfg.pricing.currency().as_str(), "USD");
        assert_eq!(cfg.listings.default_currency.as_str(), "USD");
        assert!(cfg.listings.mark_items_listed);
        assert!(cfg.seed_dev_data);
    }

    #[test]
    fn non_numeric_markup_names_the_variable() {
        let err = config(&[(PRICING_DEFAULT_MARKUP, "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: PRICING_DEFAULT_MARKUP, .. }));
    }

    #[test]
    fn out_of_range_pricing_is_rejected() {
        let err = config(&[(PRICING_DEFAULT_MARKUP, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: PRICING_DEFAULT_MARKUP, .. }));

        let err = config(&[(PRICING_FLOOR, "-1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: PRICING_FLOOR, .. }));

        let err = config(&[(PRICING_DEFAULT_MARKUP, "5000")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: PRICING_DEFAULT_MARKUP, .. }));
    }

    #[test]
    fn persistent_storage_requires_database_url() {
        let err = config(&[(USE_PERSISTENT_STORES, "true")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(DATABASE_URL));

        let cfg = config(&[
            (USE_PERSISTENT_STORES, "true"),
            (DATABASE_URL, "postgres://localhost/cardstock"),
            (DATABASE_MAX_CONNECTIONS, "4"),
        ])
        .unwrap();
        assert_eq!(
            cfg.storage,
            StorageConfig::Postgres {
                database_url: "postgres://localhost/cardstock".to_string(),
                max_connections: 4,
            }
        );
    }

    #[test]
    fn bad_boolean_and_bind_addr_are_rejected() {
        assert!(config(&[(LISTINGS_MARK_ITEMS_LISTED, "sometimes")]).is_err());
        assert!(config(&[(BIND_ADDR, "not-an-addr")]).is_err());
        assert_eq!(
            config(&[(BIND_ADDR, "127.0.0.1:3000")]).unwrap().bind_addr,
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
    }
}
