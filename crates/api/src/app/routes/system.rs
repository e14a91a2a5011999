use axum::Json;
use chrono::Utc;

use crate::app::dto::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        at: Utc::now(),
    })
}
