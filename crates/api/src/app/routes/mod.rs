use axum::Router;

pub mod catalog;
pub mod inventory;
pub mod listings;
pub mod locations;
pub mod pricing;
pub mod system;

/// Router for all organization-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/inventory", inventory::router())
        .nest("/pricing", pricing::router())
        .nest("/listings", listings::router())
        .nest("/cards", catalog::router())
        .nest("/locations", locations::router())
}
