use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use chrono::Local;
use mealmaker_order::NewOrder;
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{numeric_id, ApiJson, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-orders-by-partner/{partner_id}", get(list_by_partner))
        .route("/get-orders-by-user/{user_id}", get(list_by_user))
        .route("/create-order/{user_id}", post(create_order))
        .route("/update-order/{order_id}", patch(update_order))
}

#[utoipa::path(
    get,
    path = "/api/get-orders-by-partner/{partner_id}",
    responses(
        (status = 200, description = "Today's orders, newest first", body = [OrderViewResponse]),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
        (status = 404, description = "An assigned delivery person no longer exists", body = ApiErrorResponse),
    ),
    params(
        ("partner_id" = i64, Path, description = "Numeric partner id"),
        ("feed" = Option<String>, Query, description = "When present, delivered orders are left out")
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn list_by_partner(
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<OrderViewResponse>>, ApiError> {
    let partner_id = numeric_id(&partner_id)?;
    let feed = query.contains_key("feed");
    let orders = state
        .orders
        .list_by_partner(partner_id, feed, &Local::now())
        .await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/get-orders-by-user/{user_id}",
    responses(
        (status = 200, description = "Every order of the user, newest first", body = [OrderViewResponse]),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
    ),
    params(
        ("user_id" = String, Path, description = "User id")
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderViewResponse>>, ApiError> {
    let orders = state.orders.list_by_user(&user_id, &Local).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/create-order/{user_id}",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = CreateOrderResponse),
        (status = 400, description = "Invalid id or payload", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    params(
        ("user_id" = String, Path, description = "Id of the ordering user")
    ),
    tag = "orders"
)]
#[instrument(skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let order = state
        .orders
        .create(
            &user_id,
            NewOrder {
                partner_id: payload.partner_id,
                dishes: payload.dishes.into_iter().map(Into::into).collect(),
                payment_type: payload.payment_type,
                delivery_type: payload.delivery_type,
                quantity_total: payload.quantity_total,
                total: payload.total,
            },
        )
        .await?;

    Ok(Json(CreateOrderResponse {
        status_code: 200,
        order: order.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/update-order/{order_id}",
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Status written", body = MessageResponse),
        (status = 400, description = "Invalid id or payload", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("order_id" = i64, Path, description = "Sequential order id"),
        ("delivery_id" = Option<i64>, Query, description = "Delivery person to assign")
    ),
    tag = "orders"
)]
#[instrument(skip(state, payload), fields(status = payload.status))]
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(query): Query<UpdateOrderQuery>,
    ApiJson(payload): ApiJson<UpdateOrderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order_id = numeric_id(&order_id)?;
    let delivery_id = query
        .delivery_id
        .as_deref()
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                ApiError::BadRequest("Formato de ID de entregador inválido".to_string())
            })
        })
        .transpose()?;

    state
        .orders
        .update_status(order_id, payload.status, delivery_id)
        .await?;

    Ok(Json(MessageResponse::new(
        200,
        "Status do pedido atualizado com sucesso",
    )))
}
