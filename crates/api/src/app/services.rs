use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context;
use chrono::Utc;

use cardstock_infra::{AppConfig, InMemoryStore, PostgresStore, StorageConfig, Store};
use cardstock_listings::ListingPolicy;
use cardstock_pricing::PricingPolicy;

/// Shared per-process state handed to every handler.
pub struct AppServices {
    store: Arc<dyn Store>,
    pricing: RwLock<PricingPolicy>,
    listings: ListingPolicy,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, pricing: PricingPolicy, listings: ListingPolicy) -> Self {
        Self {
            store,
            pricing: RwLock::new(pricing),
            listings,
        }
    }

    /// In-memory store with default policies.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            PricingPolicy::default(),
            ListingPolicy::default(),
        )
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Snapshot of the current pricing policy.
    pub fn pricing_policy(&self) -> PricingPolicy {
        self.pricing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace_pricing_policy(&self, policy: PricingPolicy) {
        *self.pricing.write().unwrap_or_else(PoisonError::into_inner) = policy;
    }

    pub fn listing_policy(&self) -> &ListingPolicy {
        &self.listings
    }
}

/// Wire the store selected by configuration and apply the dev seed if asked.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn Store> = match &config.storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory store");
            Arc::new(InMemoryStore::new())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            tracing::info!(max_connections, "using postgres store");
            Arc::new(
                PostgresStore::connect(database_url, *max_connections)
                    .await
                    .context("failed to open postgres store")?,
            )
        }
    };

    if config.seed_dev_data {
        cardstock_infra::seed_dev_data(store.as_ref(), Utc::now())
            .await
            .context("failed to seed dev data")?;
    }

    Ok(AppServices::new(
        store,
        config.pricing.clone(),
        config.listings.clone(),
    ))
}
