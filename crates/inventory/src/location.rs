use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cardstock_core::{DomainError, DomainResult, Entity, LocationId, OrgId, OrgOwned};

/// A named storage bin belonging to an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub org_id: OrgId,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// Command: CreateLocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLocation {
    pub org_id: OrgId,
    pub location_id: LocationId,
    pub name: String,
    pub kind: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Location {
    pub const DEFAULT_KIND: &'static str = "BIN";

    pub fn create(cmd: CreateLocation) -> DomainResult<Self> {
        let name = cmd.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }

        let kind = match cmd.kind.as_deref().map(str::trim) {
            Some(k) if !k.is_empty() => k.to_ascii_uppercase(),
            _ => Self::DEFAULT_KIND.to_string(),
        };

        Ok(Self {
            id: cmd.location_id,
            org_id: cmd.org_id,
            name,
            kind,
            created_at: cmd.occurred_at,
        })
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl OrgOwned for Location {
    fn org_id(&self) -> OrgId {
        self.org_id
    }
}
