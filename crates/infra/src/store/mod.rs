//! Repository traits and their in-memory and Postgres implementations.
//!
//! Every operation is scoped to an organization. A row belonging to another
//! org is indistinguishable from a missing row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use cardstock_catalog::{Card, CatalogQuery};
use cardstock_core::{
    DomainError, InventoryItemId, ListingId, LocationId, OrgId, Organization, Page, PageRequest,
};
use cardstock_inventory::{InventoryItem, InventoryStatus, Location};
use cardstock_listings::{Listing, ListingError, ListingPolicy, ListingProposal, ListingStatus};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Store-level error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named entity does not exist in the caller's organization.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Acquisition cost held on hand (`ACTIVE` and `LISTED` items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValue {
    pub total_cost: Decimal,
    pub item_count: u64,
}

impl InventoryValue {
    /// Count one more on-hand item, failing if the total leaves `Decimal` range.
    pub fn with_item(self, acquisition_cost: Decimal) -> StoreResult<Self> {
        let total_cost = self
            .total_cost
            .checked_add(acquisition_cost)
            .ok_or_else(|| DomainError::invariant("inventory value overflows"))?;
        Ok(Self {
            total_cost,
            item_count: self.item_count + 1,
        })
    }
}

impl Default for InventoryValue {
    fn default() -> Self {
        Self {
            total_cost: Decimal::ZERO,
            item_count: 0,
        }
    }
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Persist a freshly validated item. Its location must exist in the item's org.
    async fn add_item(&self, item: InventoryItem) -> StoreResult<InventoryItem>;

    async fn get_item(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
    ) -> StoreResult<Option<InventoryItem>>;

    /// Items matching `ids` in request order, duplicates and misses dropped.
    async fn find_items(
        &self,
        org_id: OrgId,
        ids: &[InventoryItemId],
    ) -> StoreResult<Vec<InventoryItem>>;

    /// Newest first: `created_at` desc, then id desc.
    async fn list_items(
        &self,
        org_id: OrgId,
        status: Option<InventoryStatus>,
        page: PageRequest,
    ) -> StoreResult<Page<InventoryItem>>;

    async fn move_item(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
        location_id: LocationId,
    ) -> StoreResult<InventoryItem>;

    async fn change_item_status(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
        status: InventoryStatus,
    ) -> StoreResult<InventoryItem>;

    async fn inventory_value(&self, org_id: OrgId) -> StoreResult<InventoryValue>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Validate and persist a whole batch atomically. Nothing is written on failure.
    async fn create_listings(
        &self,
        org_id: OrgId,
        proposals: &[ListingProposal],
        policy: &ListingPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Listing>>;

    /// Newest first: `created_at` desc, then id desc.
    async fn list_listings(
        &self,
        org_id: OrgId,
        status: Option<ListingStatus>,
    ) -> StoreResult<Vec<Listing>>;

    async fn change_listing_status(
        &self,
        org_id: OrgId,
        id: ListingId,
        status: ListingStatus,
    ) -> StoreResult<Listing>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn search_cards(&self, query: &CatalogQuery) -> StoreResult<Vec<Card>>;

    /// Insert a card. A duplicate `(set_code, number)` is a conflict.
    async fn insert_card(&self, card: Card) -> StoreResult<Card>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// A duplicate name within the org is a conflict.
    async fn create_location(&self, location: Location) -> StoreResult<Location>;

    /// Ordered by name.
    async fn list_locations(&self, org_id: OrgId) -> StoreResult<Vec<Location>>;

    async fn get_location(&self, org_id: OrgId, id: LocationId) -> StoreResult<Option<Location>>;
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn insert_organization(&self, org: Organization) -> StoreResult<Organization>;

    async fn organization_count(&self) -> StoreResult<u64>;
}

/// Everything the HTTP layer needs from storage.
pub trait Store:
    InventoryRepository
    + ListingRepository
    + CatalogRepository
    + LocationRepository
    + OrganizationRepository
{
}

impl<T> Store for T where
    T: InventoryRepository
        + ListingRepository
        + CatalogRepository
        + LocationRepository
        + OrganizationRepository
{
}
