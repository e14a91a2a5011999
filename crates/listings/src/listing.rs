use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cardstock_core::{
    CurrencyCode, DomainResult, Entity, InventoryItemId, ListingId, OrgId, OrgOwned,
};

use crate::status::ListingStatus;

/// Sales channel tag for listings created through this service.
pub const INTERNAL_CHANNEL: &str = "INTERNAL";

/// A resale offer derived from one inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    id: ListingId,
    org_id: OrgId,
    inventory_item_id: InventoryItemId,
    price: Decimal,
    currency: CurrencyCode,
    status: ListingStatus,
    channel: String,
    created_at: DateTime<Utc>,
}

/// Flat persisted form of a [`Listing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: ListingId,
    pub org_id: OrgId,
    pub inventory_item_id: InventoryItemId,
    pub price: Decimal,
    pub currency: CurrencyCode,
    pub status: ListingStatus,
    pub channel: String,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Build a fresh `ACTIVE` listing on the internal channel.
    ///
    /// Callers are the batch planner, which has already checked the source item.
    pub(crate) fn new_active(
        id: ListingId,
        org_id: OrgId,
        inventory_item_id: InventoryItemId,
        price: Decimal,
        currency: CurrencyCode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            org_id,
            inventory_item_id,
            price,
            currency,
            status: ListingStatus::Active,
            channel: INTERNAL_CHANNEL.to_string(),
            created_at,
        }
    }

    pub fn from_record(record: ListingRecord) -> Self {
        Self {
            id: record.id,
            org_id: record.org_id,
            inventory_item_id: record.inventory_item_id,
            price: record.price,
            currency: record.currency,
            status: record.status,
            channel: record.channel,
            created_at: record.created_at,
        }
    }

    pub fn to_record(&self) -> ListingRecord {
        ListingRecord {
            id: self.id,
            org_id: self.org_id,
            inventory_item_id: self.inventory_item_id,
            price: self.price,
            currency: self.currency.clone(),
            status: self.status,
            channel: self.channel.clone(),
            created_at: self.created_at,
        }
    }

    pub fn id_typed(&self) -> ListingId {
        self.id
    }

    pub fn inventory_item_id(&self) -> InventoryItemId {
        self.inventory_item_id
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn transition_to(&mut self, to: ListingStatus) -> DomainResult<()> {
        self.status = self.status.transition_to(to)?;
        Ok(())
    }
}

impl Entity for Listing {
    type Id = ListingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl OrgOwned for Listing {
    fn org_id(&self) -> OrgId {
        self.org_id
    }
}
