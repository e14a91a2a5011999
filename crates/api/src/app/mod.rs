//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and shared policies
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use cardstock_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Prefix for all organization-scoped routes.
pub const API_PREFIX: &str = "/api/v0";

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router_with(Arc::new(services)))
}

/// Router over already-built services; tests use this with an in-memory store.
pub fn router_with(services: Arc<AppServices>) -> Router {
    // Domain routes: require an organization context.
    let scoped = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn(middleware::org_context_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest(API_PREFIX, scoped)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
