use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cardstock_core::{CardId, DomainError, DomainResult, Entity};

/// A catalog entry, identified by set code + collector number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub set_code: String,
    pub number: String,
    pub name: String,
    pub rarity: String,
    /// Free-form extra data from the upstream catalog (images, market-price hints).
    pub attributes: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        id: CardId,
        set_code: impl Into<String>,
        number: impl Into<String>,
        name: impl Into<String>,
        rarity: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let set_code = set_code.into().trim().to_ascii_uppercase();
        let number = number.into().trim().to_string();
        let name = name.into().trim().to_string();

        if set_code.is_empty() {
            return Err(DomainError::validation("set code cannot be empty"));
        }
        if number.is_empty() {
            return Err(DomainError::validation("card number cannot be empty"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("card name cannot be empty"));
        }

        Ok(Self {
            id,
            set_code,
            number,
            name,
            rarity: rarity.into(),
            attributes: None,
            created_at,
        })
    }

    /// Human-readable printing key, e.g. `SV1-001`.
    pub fn printing_key(&self) -> String {
        format!("{}-{}", self.set_code, self.number)
    }
}

impl Entity for Card {
    type Id = CardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
