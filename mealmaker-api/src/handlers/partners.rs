use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Local;
use mealmaker_partner::NewPartner;
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{numeric_id, ApiJson, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-bff/{partner_id}", get(get_bff))
        .route("/create-partner", post(create_partner))
}

#[utoipa::path(
    get,
    path = "/api/get-bff/{partner_id}",
    responses(
        (status = 200, description = "Partner storefront", body = StorefrontResponse),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
        (status = 404, description = "Partner not found", body = ApiErrorResponse),
    ),
    params(
        ("partner_id" = i64, Path, description = "Numeric partner id")
    ),
    tag = "partners"
)]
#[instrument(skip(state))]
pub async fn get_bff(
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
) -> Result<Json<StorefrontResponse>, ApiError> {
    let partner_id = numeric_id(&partner_id)?;
    let front = state
        .partners
        .storefront(partner_id, &Local::now())
        .await?;
    Ok(Json(front.into()))
}

#[utoipa::path(
    post,
    path = "/api/create-partner",
    request_body = CreatePartnerRequest,
    responses(
        (status = 200, description = "Partner registered", body = PartnerResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
    ),
    tag = "partners"
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_partner(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePartnerRequest>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state
        .partners
        .create(NewPartner {
            name: payload.name,
            cnpj: payload.cnpj,
            logo: payload.logo,
            schedules: payload.schedules.into_iter().map(Into::into).collect(),
            delivery_fee: payload.delivery_fee,
        })
        .await?;
    Ok(Json(partner.into()))
}
