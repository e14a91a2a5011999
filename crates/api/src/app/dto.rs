use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cardstock_core::{CardId, CurrencyCode, InventoryItemId, LocationId, OrgId, OrgOwned};
use cardstock_inventory::{InventoryItem, InventoryStatus};
use cardstock_listings::{Listing, ListingRecord};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListListingsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchCardsQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub org_id: Option<String>,
    pub card_id: CardId,
    pub condition: Option<String>,
    pub grade: Option<Decimal>,
    pub acquisition_cost: Decimal,
    pub location_id: LocationId,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemRequest {
    pub org_id: Option<String>,
    pub location_id: Option<LocationId>,
}

/// `?locationId=` form of a move; the body may be omitted when it is present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemQuery {
    pub location_id: Option<LocationId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub org_id: Option<String>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub org_id: Option<String>,
    pub name: String,
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PricingPolicyRequest {
    pub markup: Decimal,
    pub floor: Decimal,
    pub currency: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: InventoryItemId,
    pub org_id: OrgId,
    pub card_id: CardId,
    pub condition: String,
    pub grade: Option<Decimal>,
    pub acquisition_cost: Decimal,
    pub location_id: LocationId,
    pub status: InventoryStatus,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&InventoryItem> for ItemResponse {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id_typed(),
            org_id: item.org_id(),
            card_id: item.card_id(),
            condition: item.condition().to_string(),
            grade: item.grade(),
            acquisition_cost: item.acquisition_cost(),
            location_id: item.location_id(),
            status: item.status(),
            photos: item.photos().to_vec(),
            created_at: item.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedListingsResponse {
    pub listings: Vec<ListingRecord>,
}

impl CreatedListingsResponse {
    pub fn new(listings: &[Listing]) -> Self {
        Self {
            listings: listings.iter().map(Listing::to_record).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValueResponse {
    pub total_value: Decimal,
    pub item_count: u64,
    pub currency: CurrencyCode,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub at: DateTime<Utc>,
}
