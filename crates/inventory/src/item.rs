use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cardstock_core::{
    CardId, DomainError, DomainResult, Entity, InventoryItemId, LocationId, OrgId, OrgOwned,
    ensure_amount,
};

use crate::status::InventoryStatus;

/// Condition grade assumed when the caller does not supply one.
pub const DEFAULT_CONDITION: &str = "NM";

/// Highest numeric grade on the grading scale.
const MAX_GRADE: Decimal = Decimal::TEN;

/// One physical unit of stock.
///
/// Fields are private: the location and status only change through
/// [`InventoryItem::move_to`] and [`InventoryItem::transition_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    id: InventoryItemId,
    org_id: OrgId,
    card_id: CardId,
    condition: String,
    grade: Option<Decimal>,
    acquisition_cost: Decimal,
    location_id: LocationId,
    status: InventoryStatus,
    photos: Vec<String>,
    created_at: DateTime<Utc>,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub org_id: OrgId,
    pub item_id: InventoryItemId,
    pub card_id: CardId,
    pub condition: Option<String>,
    pub grade: Option<Decimal>,
    pub acquisition_cost: Decimal,
    pub location_id: LocationId,
    pub photos: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Flat persisted form of an [`InventoryItem`], used by stores to rehydrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemRecord {
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

impl InventoryItem {
    /// Validate an `AddItem` command and build a new `ACTIVE` item.
    pub fn add(cmd: AddItem) -> DomainResult<Self> {
        let acquisition_cost = ensure_amount(cmd.acquisition_cost, "acquisition cost")?;

        let condition = match cmd.condition.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_CONDITION.to_string(),
        };

        if let Some(grade) = cmd.grade {
            if grade <= Decimal::ZERO || grade > MAX_GRADE {
                return Err(DomainError::validation(format!(
                    "grade must be greater than 0 and at most {MAX_GRADE}"
                )));
            }
        }

        let photos = cmd
            .photos
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Self {
            id: cmd.item_id,
            org_id: cmd.org_id,
            card_id: cmd.card_id,
            condition,
            grade: cmd.grade,
            acquisition_cost,
            location_id: cmd.location_id,
            status: InventoryStatus::Active,
            photos,
            created_at: cmd.occurred_at,
        })
    }

    pub fn from_record(record: InventoryItemRecord) -> Self {
        Self {
            id: record.id,
            org_id: record.org_id,
            card_id: record.card_id,
            condition: record.condition,
            grade: record.grade,
            acquisition_cost: record.acquisition_cost,
            location_id: record.location_id,
            status: record.status,
            photos: record.photos,
            created_at: record.created_at,
        }
    }

    pub fn to_record(&self) -> InventoryItemRecord {
        InventoryItemRecord {
            id: self.id,
            org_id: self.org_id,
            card_id: self.card_id,
            condition: self.condition.clone(),
            grade: self.grade,
            acquisition_cost: self.acquisition_cost,
            location_id: self.location_id,
            status: self.status,
            photos: self.photos.clone(),
            created_at: self.created_at,
        }
    }

    pub fn id_typed(&self) -> InventoryItemId {
        self.id
    }

    pub fn card_id(&self) -> CardId {
        self.card_id
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn grade(&self) -> Option<Decimal> {
        self.grade
    }

    pub fn acquisition_cost(&self) -> Decimal {
        self.acquisition_cost
    }

    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    pub fn status(&self) -> InventoryStatus {
        self.status
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_listable(&self) -> bool {
        self.status == InventoryStatus::Active
    }

    /// Move the item to another storage location. Nothing else changes.
    pub fn move_to(&mut self, location_id: LocationId) {
        self.location_id = location_id;
    }

    /// Apply a status change through the transition table.
    pub fn transition_to(&mut self, to: InventoryStatus) -> DomainResult<()> {
        self.status = self.status.transition_to(to)?;
        Ok(())
    }
}

impl Entity for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl OrgOwned for InventoryItem {
    fn org_id(&self) -> OrgId {
        self.org_id
    }
}
