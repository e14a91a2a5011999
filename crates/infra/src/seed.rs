//! Development seed data.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cardstock_catalog::Card;
use cardstock_core::{CardId, LocationId, OrgId, Organization};
use cardstock_inventory::{CreateLocation, Location};

use crate::store::{
    CatalogRepository, LocationRepository, OrganizationRepository, Store, StoreResult,
};

/// Fixed id of the development organization.
pub const DEV_ORG_ID: OrgId = OrgId::from_uuid(Uuid::from_u128(1));

const DEV_ORG_NAME: &str = "Dev Org";
const DEV_BIN_COUNT: u32 = 10;

/// Seed one organization, its storage bins and a sample card.
///
/// Runs only against a store with no organizations; returns whether it wrote anything.
pub async fn seed_dev_data(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<bool> {
    if store.organization_count().await? > 0 {
        tracing::debug!("store already has organizations; skipping dev seed");
        return Ok(false);
    }

    store
        .insert_organization(Organization::new(DEV_ORG_ID, DEV_ORG_NAME, now))
        .await?;

    for n in 1..=DEV_BIN_COUNT {
        let location = Location::create(CreateLocation {
            org_id: DEV_ORG_ID,
            location_id: LocationId::new(),
            name: format!("BIN-{n:02}"),
            kind: None,
            occurred_at: now,
        })?;
        store.create_location(location).await?;
    }

    let card = Card::new(CardId::new(), "SV1", "001", "Sprigatito", "Common", now)?;
    store.insert_card(card).await?;

    tracing::info!(org_id = %DEV_ORG_ID, bins = DEV_BIN_COUNT, "seeded dev data");
    Ok(true)
}
