use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::OrgId;

/// Tenant boundary: every other entity references an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub const DEFAULT_PLAN: &'static str = "internal";

    pub fn new(id: OrgId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            plan: Self::DEFAULT_PLAN.to_string(),
            created_at,
        }
    }
}

impl Entity for Organization {
    type Id = OrgId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
