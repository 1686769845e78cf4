use axum::{
    extract::{Extension, Path, State},
    middleware,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use mealmaker_auth::{Claims, PasswordChange, SignIn, SignUp};
use tracing::instrument;

use crate::error::ApiError;
use crate::middleware::require_bearer;
use crate::models::*;

use super::{ApiJson, AppState};

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/update-user-password/{phone_number}",
            post(update_password),
        )
        .route("/get-users", get(list_users))
        .route("/get-user/{user_id}", get(get_user))
        .route("/update-user-address/{user_id}", patch(update_address))
        .route_layer(middleware::from_fn_with_state(state, require_bearer));

    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .merge(protected)
}

#[utoipa::path(
    post,
    path = "/api/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "User registered", body = SignUpResponse),
        (status = 400, description = "Invalid payload or phone already registered", body = ApiErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(phone_number = %payload.phone_number))]
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignUpRequest>,
) -> Result<Json<SignUpResponse>, ApiError> {
    let user = state
        .users
        .sign_up(SignUp {
            name: payload.name,
            phone_number: payload.phone_number,
            password: payload.password,
            address: payload.address.into(),
        })
        .await?;

    Ok(Json(SignUpResponse {
        status_code: 200,
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Session opened", body = SignInResponse),
        (status = 400, description = "Unknown phone or wrong password", body = ApiErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(phone_number = %payload.phone_number))]
pub async fn sign_in(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let session = state
        .users
        .sign_in(SignIn {
            phone_number: payload.phone_number,
            password: payload.password,
        })
        .await?;

    Ok(Json(session.into()))
}

#[utoipa::path(
    post,
    path = "/api/update-user-password/{phone_number}",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid token, payload or credentials", body = ApiErrorResponse),
        (status = 403, description = "Token belongs to another user", body = ApiErrorResponse),
    ),
    params(
        ("phone_number" = String, Path, description = "Phone number the account was registered with")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state, claims, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(phone_number): Path<String>,
    ApiJson(payload): ApiJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if claims.sub != phone_number {
        return Err(ApiError::Forbidden(
            "Não é permitido alterar a senha de outro usuário".to_string(),
        ));
    }

    state
        .users
        .update_password(
            &phone_number,
            PasswordChange {
                password: payload.password,
                new_password: payload.new_password,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new(200, "Senha alterada com sucesso")))
}

#[utoipa::path(
    get,
    path = "/api/get-users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 400, description = "Invalid token", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/get-user/{user_id}",
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Invalid token or id", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    params(
        ("user_id" = String, Path, description = "User id")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get(&user_id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/api/update-user-address/{user_id}",
    request_body = AddressBody,
    responses(
        (status = 200, description = "Address replaced", body = UserResponse),
        (status = 400, description = "Invalid token, id or payload", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    params(
        ("user_id" = String, Path, description = "User id")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn update_address(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<AddressBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.update_address(&user_id, payload.into()).await?;
    Ok(Json(user.into()))
}
