use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;

use cardstock_core::ListingId;
use cardstock_infra::ListingRepository;
use cardstock_listings::{Listing, ListingProposal, ListingRecord, ListingStatus};

use crate::app::{dto, errors, services::AppServices};
use crate::context::OrgContext;
use crate::middleware::ensure_body_org;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_listings).post(create_listings))
        .route("/:id/status", patch(change_status))
}

/// Create a batch of listings. Any invalid proposal rejects the whole batch.
pub async fn create_listings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    body: Result<Json<Vec<ListingProposal>>, JsonRejection>,
) -> axum::response::Response {
    let Json(proposals) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services
        .store()
        .create_listings(org.org_id(), &proposals, services.listing_policy(), Utc::now())
        .await
    {
        Ok(listings) => Json(dto::CreatedListingsResponse::new(&listings)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_listings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    query: Result<Query<dto::ListListingsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<ListingStatus>() {
            Ok(s) => Some(s),
            Err(e) => return errors::domain_error_to_response(e),
        },
    };

    match services.store().list_listings(org.org_id(), status).await {
        Ok(rows) => {
            let rows: Vec<ListingRecord> = rows.iter().map(Listing::to_record).collect();
            Json(rows).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::ChangeStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ListingId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid listing id");
        }
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    if let Err(resp) = ensure_body_org(&org, body.org_id.as_deref()) {
        return resp;
    }
    let status = match body.status.parse::<ListingStatus>() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .store()
        .change_listing_status(org.org_id(), id, status)
        .await
    {
        Ok(listing) => Json(listing.to_record()).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
