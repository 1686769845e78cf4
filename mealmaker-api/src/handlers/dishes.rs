use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use mealmaker_partner::{DishPatch, NewDish};
use tracing::instrument;

use crate::error::ApiError;
use crate::models::*;

use super::{ApiJson, AppState};

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-dishes", get(list_dishes))
        .route("/get-dish/{id}", get(get_dish))
        .route("/create-dish", post(create_dish))
        .route(
            "/upload-image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/update-dish/{id}", patch(update_dish))
        .route("/delete-dish/{id}", delete(delete_dish))
}

#[utoipa::path(
    get,
    path = "/api/get-dishes",
    responses(
        (status = 200, description = "Every dish, newest first", body = [DishResponse]),
    ),
    tag = "dishes"
)]
#[instrument(skip(state))]
pub async fn list_dishes(
    State(state): State<AppState>,
) -> Result<Json<Vec<DishResponse>>, ApiError> {
    let dishes = state.catalog.list_dishes().await?;
    Ok(Json(dishes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/get-dish/{id}",
    responses(
        (status = 200, description = "Dish", body = DishResponse),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Dish id")
    ),
    tag = "dishes"
)]
#[instrument(skip(state))]
pub async fn get_dish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DishResponse>, ApiError> {
    let dish = state.catalog.get_dish(&id).await?;
    Ok(Json(dish.into()))
}

#[utoipa::path(
    post,
    path = "/api/create-dish",
    request_body = DishRequest,
    responses(
        (status = 200, description = "Dish created", body = CreateDishResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
    ),
    tag = "dishes"
)]
#[instrument(skip(state, payload), fields(title = %payload.title))]
pub async fn create_dish(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DishRequest>,
) -> Result<Json<CreateDishResponse>, ApiError> {
    let dish = state
        .catalog
        .create_dish(NewDish {
            title: payload.title,
            price: payload.price,
            description: payload.description,
            serves: payload.serves,
            img_url: payload.img_url,
            active: payload.active,
            max_accompaniments_count: payload.max_accompaniments_count,
            accompaniments: payload.accompaniments,
        })
        .await?;

    Ok(Json(CreateDishResponse {
        status_code: 201,
        message: "Prato criado com sucesso".to_string(),
        dish: dish.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/upload-image",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Missing file or extension", body = ApiErrorResponse),
    ),
    tag = "dishes"
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Arquivo vazio".to_string()));
        }

        let image_url = state.images.save(&file_name, &bytes).await?;
        return Ok(Json(UploadImageResponse {
            status_code: 201,
            image_url,
        }));
    }

    Err(ApiError::BadRequest(
        "Campo 'image' não encontrado no formulário".to_string(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/update-dish/{id}",
    request_body = DishPatchRequest,
    responses(
        (status = 200, description = "Dish updated", body = MessageResponse),
        (status = 400, description = "Invalid id or payload", body = ApiErrorResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Dish id")
    ),
    tag = "dishes"
)]
#[instrument(skip(state, payload))]
pub async fn update_dish(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<DishPatchRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .catalog
        .update_dish(
            &id,
            DishPatch {
                title: payload.title,
                price: payload.price,
                description: payload.description,
                serves: payload.serves,
                img_url: payload.img_url,
                active: payload.active,
                max_accompaniments_count: payload.max_accompaniments_count,
                accompaniments: payload.accompaniments,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new(200, "Prato atualizado com sucesso")))
}

#[utoipa::path(
    delete,
    path = "/api/delete-dish/{id}",
    responses(
        (status = 200, description = "Dish deleted", body = MessageResponse),
        (status = 400, description = "Invalid id", body = ApiErrorResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Dish id")
    ),
    tag = "dishes"
)]
#[instrument(skip(state))]
pub async fn delete_dish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_dish(&id).await?;
    Ok(Json(MessageResponse::new(200, "Prato removido com sucesso")))
}
