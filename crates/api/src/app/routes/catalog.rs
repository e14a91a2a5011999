use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use cardstock_catalog::CatalogQuery;
use cardstock_infra::CatalogRepository;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/", get(search_cards))
}

pub async fn search_cards(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::SearchCardsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };

    match services
        .store()
        .search_cards(&CatalogQuery::new(query.search.as_deref()))
        .await
    {
        Ok(cards) => Json(cards).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
