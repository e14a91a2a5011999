use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use cardstock_core::{CurrencyCode, InventoryItemId};
use cardstock_infra::InventoryRepository;
use cardstock_pricing::{evaluate, PricingPolicy};

use crate::app::{dto, errors, services::AppServices};
use crate::context::OrgContext;

pub fn router() -> Router {
    Router::new()
        .route("/evaluate", post(evaluate_prices))
        .route("/policy", get(get_policy).put(replace_policy))
}

/// Suggested prices for a set of inventory item ids. Read-only.
pub async fn evaluate_prices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    body: Result<Json<Vec<InventoryItemId>>, JsonRejection>,
) -> axum::response::Response {
    let Json(ids) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let items = match services.store().find_items(org.org_id(), &ids).await {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };

    let policy = services.pricing_policy();
    let evaluation = match evaluate(&policy, &ids, &items) {
        Ok(evaluation) => evaluation,
        Err(e) => return errors::domain_error_to_response(e),
    };
    tracing::debug!(
        org_id = %org.org_id(),
        quoted = evaluation.results.len(),
        rejected = evaluation.rejected.len(),
        "pricing evaluated"
    );
    Json(evaluation).into_response()
}

pub async fn get_policy(Extension(services): Extension<Arc<AppServices>>) -> Json<PricingPolicy> {
    Json(services.pricing_policy())
}

pub async fn replace_policy(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PricingPolicyRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let policy = match CurrencyCode::parse(&body.currency)
        .and_then(|currency| PricingPolicy::new(body.markup, body.floor, currency))
    {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    services.replace_pricing_policy(policy.clone());
    tracing::info!(markup = %policy.markup(), floor = %policy.floor(), "pricing policy replaced");
    Json(policy).into_response()
}
