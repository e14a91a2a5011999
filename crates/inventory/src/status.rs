//! Inventory item lifecycle status and its transition table.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cardstock_core::{DomainError, DomainResult};

/// Lifecycle status of an inventory item.
///
/// `IN_STOCK` is accepted as an input alias for `ACTIVE`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStatus {
    #[serde(alias = "IN_STOCK")]
    Active,
    Listed,
    Sold,
    Damaged,
}

impl InventoryStatus {
    pub const ALL: [InventoryStatus; 4] = [
        InventoryStatus::Active,
        InventoryStatus::Listed,
        InventoryStatus::Sold,
        InventoryStatus::Damaged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InventoryStatus::Active => "ACTIVE",
            InventoryStatus::Listed => "LISTED",
            InventoryStatus::Sold => "SOLD",
            InventoryStatus::Damaged => "DAMAGED",
        }
    }

    /// Whether the transition table allows `self -> to`.
    pub fn can_transition_to(self, to: InventoryStatus) -> bool {
        use InventoryStatus::*;
        matches!(
            (self, to),
            (Active, Listed)
                | (Active, Sold)
                | (Active, Damaged)
                | (Listed, Active)
                | (Listed, Sold)
                | (Listed, Damaged)
                | (Damaged, Active)
                | (Damaged, Sold)
        )
    }

    pub fn transition_to(self, to: InventoryStatus) -> DomainResult<InventoryStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DomainError::invalid_transition("inventory item", self, to))
        }
    }

    pub fn is_terminal(self) -> bool {
        Self::ALL.iter().all(|to| !self.can_transition_to(*to))
    }

    /// Items that still count as on-hand stock.
    pub fn is_on_hand(self) -> bool {
        matches!(self, InventoryStatus::Active | InventoryStatus::Listed)
    }
}

impl core::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" | "IN_STOCK" => Ok(InventoryStatus::Active),
            "LISTED" => Ok(InventoryStatus::Listed),
            "SOLD" => Ok(InventoryStatus::Sold),
            "DAMAGED" => Ok(InventoryStatus::Damaged),
            other => Err(DomainError::validation(format!(
                "unknown inventory status '{other}' (expected ACTIVE, LISTED, SOLD or DAMAGED)"
            ))),
        }
    }
}
