use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use mealmaker_delivery::NewDelivery;
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{numeric_id, ApiJson, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-deliveries", get(list_deliveries))
        .route("/create-delivery", post(create_delivery))
        .route("/update-delivery/{delivery_id}", patch(update_delivery))
        .route("/delete-delivery/{delivery_id}", delete(delete_delivery))
}

#[utoipa::path(
    get,
    path = "/api/get-deliveries",
    responses(
        (status = 200, description = "Every delivery person, newest first", body = [DeliveryResponse]),
    ),
    tag = "deliveries"
)]
#[instrument(skip(state))]
pub async fn list_deliveries(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryResponse>>, ApiError> {
    let deliveries = state.deliveries.list().await?;
    Ok(Json(deliveries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/create-delivery",
    request_body = DeliveryRequest,
    responses(
        (status = 200, description = "Delivery person registered", body = CreateDeliveryResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
    ),
    tag = "deliveries"
)]
#[instrument(skip(state, payload))]
pub async fn create_delivery(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DeliveryRequest>,
) -> Result<Json<CreateDeliveryResponse>, ApiError> {
    let delivery = state
        .deliveries
        .create(NewDelivery {
            name: payload.name,
            phone_number: payload.phone_number,
        })
        .await?;

    Ok(Json(CreateDeliveryResponse {
        status_code: 200,
        delivery: delivery.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/update-delivery/{delivery_id}",
    request_body = DeliveryRequest,
    responses(
        (status = 200, description = "Delivery person updated", body = MessageResponse),
        (status = 400, description = "Invalid id or payload", body = ApiErrorResponse),
        (status = 404, description = "Delivery person not found", body = ApiErrorResponse),
    ),
    params(
        ("delivery_id" = i64, Path, description = "Sequential delivery id")
    ),
    tag = "deliveries"
)]
#[instrument(skip(state, payload))]
pub async fn update_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<String>,
    ApiJson(payload): ApiJson<DeliveryRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let delivery_id = numeric_id(&delivery_id)?;
    state
        .deliveries
        .update(
            delivery_id,
            NewDelivery {
                name: payload.name,
                phone_number: payload.phone_number,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new(
        200,
        "Entregador atualizado com sucesso",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/delete-delivery/{delivery_id}",
    responses(
        (status = 200, description = "Delivery person removed", body = MessageResponse),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
        (status = 404, description = "Delivery person not found", body = ApiErrorResponse),
    ),
    params(
        ("delivery_id" = i64, Path, description = "Sequential delivery id")
    ),
    tag = "deliveries"
)]
#[instrument(skip(state))]
pub async fn delete_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let delivery_id = numeric_id(&delivery_id)?;
    state.deliveries.delete(delivery_id).await?;
    Ok(Json(MessageResponse::new(200, "Entregador removido com sucesso")))
}
