use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cardstock_catalog::{Card, CatalogQuery};
use cardstock_core::{
    CardId, InventoryItemId, ListingId, LocationId, OrgId, OrgOwned, Organization, Page,
    PageRequest,
};
use cardstock_inventory::{InventoryItem, InventoryStatus, Location};
use cardstock_listings::{Listing, ListingPolicy, ListingProposal, ListingStatus, plan_listings};

use super::{
    CatalogRepository, InventoryRepository, InventoryValue, ListingRepository, LocationRepository,
    OrganizationRepository, StoreError, StoreResult,
};

#[derive(Debug, Default)]
struct State {
    organizations: HashMap<OrgId, Organization>,
    cards: HashMap<CardId, Card>,
    locations: HashMap<LocationId, Location>,
    items: HashMap<InventoryItemId, InventoryItem>,
    listings: HashMap<ListingId, Listing>,
}

impl State {
    fn location_in_org(&self, org_id: OrgId, id: LocationId) -> bool {
        self.locations.get(&id).is_some_and(|l| l.org_id == org_id)
    }

    fn item_in_org_mut(
        &mut self,
        org_id: OrgId,
        id: InventoryItemId,
    ) -> Option<&mut InventoryItem> {
        self.items.get_mut(&id).filter(|i| i.org_id() == org_id)
    }
}

/// In-memory store.
///
/// Intended for tests/dev. One lock guards all tables, so a listing batch
/// validates and writes under a single write guard.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, uuid::Uuid)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl InventoryRepository for InMemoryStore {
    async fn add_item(&self, item: InventoryItem) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        if !state.location_in_org(item.org_id(), item.location_id()) {
            return Err(StoreError::NotFound("location"));
        }
        if state.items.contains_key(&item.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "inventory item {} already exists",
                item.id_typed()
            )));
        }
        state.items.insert(item.id_typed(), item.clone());
        Ok(item)
    }

    async fn get_item(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
    ) -> StoreResult<Option<InventoryItem>> {
        let state = self.read()?;
        Ok(state.items.get(&id).filter(|i| i.org_id() == org_id).cloned())
    }

    async fn find_items(
        &self,
        org_id: OrgId,
        ids: &[InventoryItemId],
    ) -> StoreResult<Vec<InventoryItem>> {
        let state = self.read()?;
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| state.items.get(id))
            .filter(|i| i.org_id() == org_id)
            .cloned()
            .collect())
    }

    async fn list_items(
        &self,
        org_id: OrgId,
        status: Option<InventoryStatus>,
        page: PageRequest,
    ) -> StoreResult<Page<InventoryItem>> {
        let state = self.read()?;
        let mut rows: Vec<InventoryItem> = state
            .items
            .values()
            .filter(|i| i.org_id() == org_id)
            .filter(|i| status.is_none_or(|s| i.status() == s))
            .cloned()
            .collect();
        newest_first(&mut rows, |i| (i.created_at(), *i.id_typed().as_uuid()));
        Ok(page.apply(rows))
    }

    async fn move_item(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
        location_id: LocationId,
    ) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        if state.item_in_org_mut(org_id, id).is_none() {
            return Err(StoreError::NotFound("inventory item"));
        }
        if !state.location_in_org(org_id, location_id) {
            return Err(StoreError::NotFound("location"));
        }
        let item = state
            .item_in_org_mut(org_id, id)
            .ok_or(StoreError::NotFound("inventory item"))?;
        item.move_to(location_id);
        Ok(item.clone())
    }

    async fn change_item_status(
        &self,
        org_id: OrgId,
        id: InventoryItemId,
        status: InventoryStatus,
    ) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        let item = state
            .item_in_org_mut(org_id, id)
            .ok_or(StoreError::NotFound("inventory item"))?;
        item.transition_to(status)?;
        Ok(item.clone())
    }

    async fn inventory_value(&self, org_id: OrgId) -> StoreResult<InventoryValue> {
        let state = self.read()?;
        state
            .items
            .values()
            .filter(|i| i.org_id() == org_id && i.status().is_on_hand())
            .try_fold(InventoryValue::default(), |acc, i| acc.with_item(i.acquisition_cost()))
    }
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn create_listings(
        &self,
        org_id: OrgId,
        proposals: &[ListingProposal],
        policy: &ListingPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Listing>> {
        let mut state = self.write()?;
        let plan = {
            let snapshot = &*state;
            plan_listings(org_id, proposals, |id| snapshot.items.get(&id), policy, now)?
        };

        for item in plan.updated_items {
            state.items.insert(item.id_typed(), item);
        }
        for listing in &plan.listings {
            state.listings.insert(listing.id_typed(), listing.clone());
        }
        Ok(plan.listings)
    }

    async fn list_listings(
        &self,
        org_id: OrgId,
        status: Option<ListingStatus>,
    ) -> StoreResult<Vec<Listing>> {
        let state = self.read()?;
        let mut rows: Vec<Listing> = state
            .listings
            .values()
            .filter(|l| l.org_id() == org_id)
            .filter(|l| status.is_none_or(|s| l.status() == s))
            .cloned()
            .collect();
        newest_first(&mut rows, |l| (l.created_at(), *l.id_typed().as_uuid()));
        Ok(rows)
    }

    async fn change_listing_status(
        &self,
        org_id: OrgId,
        id: ListingId,
        status: ListingStatus,
    ) -> StoreResult<Listing> {
        let mut state = self.write()?;
        let listing = state
            .listings
            .get_mut(&id)
            .filter(|l| l.org_id() == org_id)
            .ok_or(StoreError::NotFound("listing"))?;
        listing.transition_to(status)?;
        Ok(listing.clone())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn search_cards(&self, query: &CatalogQuery) -> StoreResult<Vec<Card>> {
        let state = self.read()?;
        Ok(query.apply(state.cards.values()))
    }

    async fn insert_card(&self, card: Card) -> StoreResult<Card> {
        let mut state = self.write()?;
        if state
            .cards
            .values()
            .any(|c| c.set_code == card.set_code && c.number == card.number)
        {
            return Err(StoreError::Conflict(format!(
                "card {} already exists",
                card.printing_key()
            )));
        }
        state.cards.insert(card.id, card.clone());
        Ok(card)
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn create_location(&self, location: Location) -> StoreResult<Location> {
        let mut state = self.write()?;
        if state
            .locations
            .values()
            .any(|l| l.org_id == location.org_id && l.name == location.name)
        {
            return Err(StoreError::Conflict(format!(
                "location '{}' already exists",
                location.name
            )));
        }
        state.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn list_locations(&self, org_id: OrgId) -> StoreResult<Vec<Location>> {
        let state = self.read()?;
        let mut rows: Vec<Location> = state
            .locations
            .values()
            .filter(|l| l.org_id == org_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_location(&self, org_id: OrgId, id: LocationId) -> StoreResult<Option<Location>> {
        let state = self.read()?;
        Ok(state.locations.get(&id).filter(|l| l.org_id == org_id).cloned())
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryStore {
    async fn insert_organization(&self, org: Organization) -> StoreResult<Organization> {
        let mut state = self.write()?;
        if state.organizations.contains_key(&org.id) {
            return Err(StoreError::Conflict(format!(
                "organization {} already exists",
                org.id
            )));
        }
        state.organizations.insert(org.id, org.clone());
        Ok(org)
    }

    async fn organization_count(&self) -> StoreResult<u64> {
        Ok(self.read()?.organizations.len() as u64)
    }
}
