use axum::Json;

use opsdesk_shared::types::api::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "opsdesk-api",
        env!("CARGO_PKG_VERSION"),
    ))
}
