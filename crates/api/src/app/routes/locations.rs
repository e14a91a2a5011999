use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use cardstock_core::LocationId;
use cardstock_infra::LocationRepository;
use cardstock_inventory::{CreateLocation, Location};

use crate::app::{dto, errors, services::AppServices};
use crate::context::OrgContext;
use crate::middleware::ensure_body_org;

pub fn router() -> Router {
    Router::new().route("/", get(list_locations).post(create_location))
}

pub async fn list_locations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
) -> axum::response::Response {
    match services.store().list_locations(org.org_id()).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_location(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    body: Result<Json<dto::CreateLocationRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    if let Err(resp) = ensure_body_org(&org, body.org_id.as_deref()) {
        return resp;
    }

    let location = match Location::create(CreateLocation {
        org_id: org.org_id(),
        location_id: LocationId::new(),
        name: body.name,
        kind: body.kind,
        occurred_at: Utc::now(),
    }) {
        Ok(l) => l,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().create_location(location).await {
        Ok(location) => (StatusCode::CREATED, Json(location)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
