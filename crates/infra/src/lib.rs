//! Infrastructure layer: configuration, persistence and dev seed data.

pub mod config;
pub mod seed;
pub mod store;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use store::{
    CatalogRepository, InMemoryStore, InventoryRepository, InventoryValue, ListingRepository,
    LocationRepository, OrganizationRepository, PostgresStore, Store, StoreError, StoreResult,
};
pub use seed::{DEV_ORG_ID, seed_dev_data};
