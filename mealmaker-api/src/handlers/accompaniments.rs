use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use mealmaker_partner::{AccompanimentUpsert, NewAccompaniment};
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{ApiJson, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-accompaniments", get(list_accompaniments))
        .route("/create-accompaniments", post(create_accompaniments))
        .route("/update-accompaniments", patch(update_accompaniments))
        .route(
            "/delete-accompaniment/{accompaniment_id}",
            delete(delete_accompaniment),
        )
}

#[utoipa::path(
    get,
    path = "/api/get-accompaniments",
    responses(
        (status = 200, description = "Every accompaniment, newest first", body = [AccompanimentResponse]),
    ),
    tag = "accompaniments"
)]
#[instrument(skip(state))]
pub async fn list_accompaniments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccompanimentResponse>>, ApiError> {
    let accompaniments = state.catalog.list_accompaniments().await?;
    Ok(Json(accompaniments.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/create-accompaniments",
    request_body = [AccompanimentRequest],
    responses(
        (status = 200, description = "Batch inserted", body = CreateAccompanimentsResponse),
        (status = 400, description = "Empty batch or invalid entry", body = ApiErrorResponse),
    ),
    tag = "accompaniments"
)]
#[instrument(skip(state, payload), fields(count = payload.len()))]
pub async fn create_accompaniments(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Vec<AccompanimentRequest>>,
) -> Result<Json<CreateAccompanimentsResponse>, ApiError> {
    let requests = payload
        .into_iter()
        .map(|item| NewAccompaniment {
            title: item.title,
            category: item.category,
            price: item.price,
            active: item.active,
        })
        .collect();
    let created = state.catalog.create_accompaniments(requests).await?;

    Ok(Json(CreateAccompanimentsResponse {
        status_code: 201,
        accompaniments: created.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/update-accompaniments",
    request_body = [AccompanimentUpsertRequest],
    responses(
        (status = 200, description = "Batch upserted", body = UpsertAccompanimentsResponse),
        (status = 400, description = "Invalid entry", body = ApiErrorResponse),
    ),
    tag = "accompaniments"
)]
#[instrument(skip(state, payload), fields(count = payload.len()))]
pub async fn update_accompaniments(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Vec<AccompanimentUpsertRequest>>,
) -> Result<Json<UpsertAccompanimentsResponse>, ApiError> {
    let requests = payload
        .into_iter()
        .map(|item| AccompanimentUpsert {
            id: item.id.filter(|id| !id.is_empty()),
            title: item.title,
            category: item.category,
            price: item.price,
            active: item.active,
        })
        .collect();
    let summary = state.catalog.upsert_accompaniments(requests).await?;

    Ok(Json(UpsertAccompanimentsResponse {
        status_code: 200,
        inserted: summary.inserted,
        updated: summary.updated,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/delete-accompaniment/{accompaniment_id}",
    responses(
        (status = 200, description = "Accompaniment deleted", body = MessageResponse),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
        (status = 404, description = "Accompaniment not found", body = ApiErrorResponse),
    ),
    params(
        ("accompaniment_id" = String, Path, description = "Accompaniment id")
    ),
    tag = "accompaniments"
)]
#[instrument(skip(state))]
pub async fn delete_accompaniment(
    State(state): State<AppState>,
    Path(accompaniment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_accompaniment(&accompaniment_id).await?;
    Ok(Json(MessageResponse::new(
        200,
        "Acompanhamento removido com sucesso",
    )))
}
