use axum::{response::Json, routing::get, Router};

use crate::models::MessageResponse;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health-check", get(health_check))
}

#[utoipa::path(
    get,
    path = "/api/health-check",
    responses(
        (status = 200, description = "Service is up", body = MessageResponse),
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new(200, "Meal Maker API no ar"))
}
