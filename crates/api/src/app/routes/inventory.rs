use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;

use cardstock_core::{InventoryItemId, PageRequest};
use cardstock_infra::InventoryRepository;
use cardstock_inventory::{AddItem, InventoryItem, InventoryStatus};

use crate::app::{dto, errors, services::AppServices, API_PREFIX};
use crate::context::OrgContext;
use crate::middleware::ensure_body_org;

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(add_item))
        .route("/items/:id", get(get_item))
        .route("/items/:id/move", patch(move_item))
        .route("/items/:id/status", patch(change_status))
        .route("/value", get(inventory_value))
}

fn parse_item_id(id: &str) -> Result<InventoryItemId, axum::response::Response> {
    id.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid inventory item id")
    })
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    query: Result<Query<dto::ListItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };

    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<InventoryStatus>() {
            Ok(s) => Some(s),
            Err(e) => return errors::domain_error_to_response(e),
        },
    };
    let page = match PageRequest::new(query.page, query.page_size) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().list_items(org.org_id(), status, page).await {
        Ok(page) => Json(page.map(|item| dto::ItemResponse::from(&item))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    body: Result<Json<dto::AddItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    if let Err(resp) = ensure_body_org(&org, body.org_id.as_deref()) {
        return resp;
    }

    let item = match InventoryItem::add(AddItem {
        org_id: org.org_id(),
        item_id: InventoryItemId::new(),
        card_id: body.card_id,
        condition: body.condition,
        grade: body.grade,
        acquisition_cost: body.acquisition_cost,
        location_id: body.location_id,
        photos: body.photos,
        occurred_at: Utc::now(),
    }) {
        Ok(item) => item,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().add_item(item).await {
        Ok(item) => {
            let location = format!("{API_PREFIX}/inventory/items/{}", item.id_typed());
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(dto::ItemResponse::from(&item)),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store().get_item(org.org_id(), id).await {
        Ok(Some(item)) => Json(dto::ItemResponse::from(&item)).into_response(),
        Ok(None) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "inventory item not found")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn move_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
    Path(id): Path<String>,
    query: Result<Query<dto::MoveItemQuery>, QueryRejection>,
    body: Result<Json<dto::MoveItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };
    let body = match body {
        Ok(Json(b)) => Some(b),
        Err(JsonRejection::MissingJsonContentType(_)) if query.location_id.is_some() => None,
        Err(e) => return errors::json_rejection(e),
    };
    if let Err(resp) = ensure_body_org(&org, body.as_ref().and_then(|b| b.org_id.as_deref())) {
        return resp;
    }

    let location_id = match (query.location_id, body.and_then(|b| b.location_id)) {
        (Some(q), Some(b)) if q != b => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "location_mismatch",
                "locationId differs between query and body",
            );
        }
        (Some(location_id), _) | (None, Some(location_id)) => location_id,
        (None, None) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "locationId is required",
            );
        }
    };

    match services.store().move_item(org.org_id(), id, location_id).await {
        Ok(item) => {
            tracing::info!(
                item_id = %item.id_typed(),
                location_id = %item.location_id(),
                "item moved"
            );
            StatusCode::NO_CONTENT.into_response()
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
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    if let Err(resp) = ensure_body_org(&org, body.org_id.as_deref()) {
        return resp;
    }
    let status = match body.status.parse::<InventoryStatus>() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .store()
        .change_item_status(org.org_id(), id, status)
        .await
    {
        Ok(item) => Json(dto::ItemResponse::from(&item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn inventory_value(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org): Extension<OrgContext>,
) -> axum::response::Response {
    match services.store().inventory_value(org.org_id()).await {
        Ok(value) => Json(dto::InventoryValueResponse {
            total_value: value.total_cost,
            item_count: value.item_count,
            currency: services.pricing_policy().currency().clone(),
        })
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
