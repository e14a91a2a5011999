use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cardstock_core::{DomainError, DomainResult};

/// Listing lifecycle: `ACTIVE` until it is sold or withdrawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Active,
    Sold,
    Withdrawn,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Sold => "SOLD",
            ListingStatus::Withdrawn => "WITHDRAWN",
        }
    }

    pub fn can_transition_to(self, to: ListingStatus) -> bool {
        matches!(
            (self, to),
            (ListingStatus::Active, ListingStatus::Sold)
                | (ListingStatus::Active, ListingStatus::Withdrawn)
        )
    }

    pub fn transition_to(self, to: ListingStatus) -> DomainResult<ListingStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DomainError::invalid_transition("listing", self, to))
        }
    }
}

impl core::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(ListingStatus::Active),
            "SOLD" => Ok(ListingStatus::Sold),
            "WITHDRAWN" => Ok(ListingStatus::Withdrawn),
            other => Err(DomainError::validation(format!(
                "unknown listing status '{other}' (expected ACTIVE, SOLD or WITHDRAWN)"
            ))),
        }
    }
}
