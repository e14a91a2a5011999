use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cardstock_core::DomainError;
use cardstock_infra::StoreError;
use cardstock_listings::ListingError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Listing(e) => listing_error_to_response(e),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Database(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "internal storage error",
            )
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", message)
        }
    }
}

/// Listing batch failures name the offending item.
pub fn listing_error_to_response(err: ListingError) -> axum::response::Response {
    let code = match &err {
        ListingError::ItemNotFound(_) => "item_not_found",
        ListingError::ItemNotListable { .. } => "item_not_listable",
        ListingError::InvalidProposal { .. } => "invalid_proposal",
    };
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": code,
            "message": err.to_string(),
            "inventoryItemId": err.inventory_item_id(),
        })),
    )
        .into_response()
}

pub fn json_rejection(rej: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rej.body_text())
}

pub fn query_rejection(rej: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rej.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
