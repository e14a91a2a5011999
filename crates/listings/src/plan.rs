//! All-or-nothing planning of a listing batch.
//!
//! Planning is pure: stores load the referenced items (inside their write
//! transaction), call [`plan_listings`], and persist the returned plan only if
//! it succeeded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cardstock_core::{CurrencyCode, InventoryItemId, ListingId, OrgId, OrgOwned, ensure_amount};
use cardstock_inventory::{InventoryItem, InventoryStatus};

use crate::error::ListingError;
use crate::listing::Listing;

/// One proposed listing as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingProposal {
    pub inventory_item_id: InventoryItemId,
    pub price: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Settings that shape listing creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPolicy {
    /// Currency used when a proposal omits one.
    pub default_currency: CurrencyCode,
    /// Move each source item `ACTIVE -> LISTED` as part of the batch.
    pub mark_items_listed: bool,
}

impl Default for ListingPolicy {
    fn default() -> Self {
        Self {
            default_currency: CurrencyCode::cad(),
            mark_items_listed: false,
        }
    }
}

/// Result of a successful plan: listings to insert and items whose status changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPlan {
    pub listings: Vec<Listing>,
    pub updated_items: Vec<InventoryItem>,
}

/// Validate every proposal in order and build the listings, failing on the first bad one.
///
/// `lookup` resolves an item id against the store snapshot being written.
/// Items outside `org_id` are treated as missing.
pub fn plan_listings<'a, F>(
    org_id: OrgId,
    proposals: &[ListingProposal],
    mut lookup: F,
    policy: &ListingPolicy,
    now: DateTime<Utc>,
) -> Result<ListingPlan, ListingError>
where
    F: FnMut(InventoryItemId) -> Option<&'a InventoryItem>,
{
    let mut plan = ListingPlan::default();

    for proposal in proposals {
        let id = proposal.inventory_item_id;

        // Earlier proposals in this batch may already have moved the item.
        let item = match plan.updated_items.iter().find(|i| i.id_typed() == id) {
            Some(updated) => updated,
            None => lookup(id)
                .filter(|i| i.org_id() == org_id)
                .ok_or(ListingError::ItemNotFound(id))?,
        };

        if !item.is_listable() {
            return Err(ListingError::ItemNotListable {
                id,
                status: item.status(),
            });
        }

        let price =
            ensure_amount(proposal.price, "price").map_err(|e| ListingError::InvalidProposal {
                id,
                reason: e.to_string(),
            })?;

        let currency =
            CurrencyCode::or_default(proposal.currency.as_deref(), &policy.default_currency)
                .map_err(|e| ListingError::InvalidProposal {
                    id,
                    reason: e.to_string(),
                })?;

        let listing = Listing::new_active(
            ListingId::new(),
            item.org_id(),
            id,
            price,
            currency,
            now,
        );

        if policy.mark_items_listed {
            let mut updated = item.clone();
            updated
                .transition_to(InventoryStatus::Listed)
                .map_err(|_| ListingError::ItemNotListable {
                    id,
                    status: updated.status(),
                })?;
            plan.updated_items.push(updated);
        }

        plan.listings.push(listing);
    }

    Ok(plan)
}
