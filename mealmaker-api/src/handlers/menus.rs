use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use mealmaker_partner::NewMenu;
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{numeric_id, ApiJson, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-menu", post(create_menu))
        .route("/get-menus/{partner_id}", get(list_menus))
}

#[utoipa::path(
    post,
    path = "/api/create-menu",
    request_body = MenuRequest,
    responses(
        (status = 200, description = "Menu created with dish snapshots", body = MenuResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "A referenced dish does not exist", body = ApiErrorResponse),
    ),
    tag = "menus"
)]
#[instrument(skip(state, payload), fields(partner_id = payload.partner_id))]
pub async fn create_menu(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MenuRequest>,
) -> Result<Json<MenuResponse>, ApiError> {
    let menu = state
        .catalog
        .create_menu(NewMenu {
            name: payload.name,
            small_description: payload.small_description,
            partner_id: payload.partner_id,
            dish_ids: payload.dishes,
        })
        .await?;
    Ok(Json(menu.into()))
}

#[utoipa::path(
    get,
    path = "/api/get-menus/{partner_id}",
    responses(
        (status = 200, description = "Menus of the partner, newest first", body = [MenuResponse]),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
    ),
    params(
        ("partner_id" = i64, Path, description = "Numeric partner id")
    ),
    tag = "menus"
)]
#[instrument(skip(state))]
pub async fn list_menus(
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
) -> Result<Json<Vec<MenuResponse>>, ApiError> {
    let partner_id = numeric_id(&partner_id)?;
    let menus = state.catalog.list_menus(partner_id).await?;
    Ok(Json(menus.into_iter().map(Into::into).collect()))
}
