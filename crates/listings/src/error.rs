use thiserror::Error;

use cardstock_core::InventoryItemId;
use cardstock_inventory::InventoryStatus;

/// Why a listing batch was rejected. Always names the first offending item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("item {0} not found")]
    ItemNotFound(InventoryItemId),

    #[error("item {id} not listable (status {status})")]
    ItemNotListable {
        id: InventoryItemId,
        status: InventoryStatus,
    },

    #[error("item {id}: {reason}")]
    InvalidProposal { id: InventoryItemId, reason: String },
}

impl ListingError {
    pub fn inventory_item_id(&self) -> InventoryItemId {
        match self {
            ListingError::ItemNotFound(id) => *id,
            ListingError::ItemNotListable { id, .. } => *id,
            ListingError::InvalidProposal { id, .. } => *id,
        }
    }
}
