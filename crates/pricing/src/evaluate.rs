//! Batch price evaluation over resolved inventory items.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use cardstock_core::{CurrencyCode, DomainResult, InventoryItemId};
use cardstock_inventory::InventoryItem;

use crate::policy::PricingPolicy;

/// Suggested price for one inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub inventory_item_id: InventoryItemId,
    pub price: Decimal,
    pub currency: CurrencyCode,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotFound,
}

/// A requested id that produced no quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedItem {
    pub inventory_item_id: InventoryItemId,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PricingEvaluation {
    pub results: Vec<PriceQuote>,
    pub rejected: Vec<RejectedItem>,
}

/// Price every resolved item once, and report requested ids that did not resolve.
///
/// `resolved` is whatever the store returned for `requested`; quotes keep its
/// order. Rejections keep request order.
pub fn evaluate<'a>(
    policy: &PricingPolicy,
    requested: &[InventoryItemId],
    resolved: impl IntoIterator<Item = &'a InventoryItem>,
) -> DomainResult<PricingEvaluation> {
    let mut seen = HashSet::new();
    let results = resolved
        .into_iter()
        .filter(|item| seen.insert(item.id_typed()))
        .map(|item| -> DomainResult<PriceQuote> {
            Ok(PriceQuote {
                inventory_item_id: item.id_typed(),
                price: policy.suggested_price(item.acquisition_cost())?,
                currency: policy.currency().clone(),
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;

    let mut reported = HashSet::new();
    let rejected = requested
        .iter()
        .filter(|id| !seen.contains(*id) && reported.insert(**id))
        .map(|id| RejectedItem {
            inventory_item_id: *id,
            reason: RejectionReason::NotFound,
        })
        .collect();

    Ok(PricingEvaluation { results, rejected })
}
