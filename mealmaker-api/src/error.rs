use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use mealmaker_auth::AuthError;
use mealmaker_delivery::DeliveryError;
use mealmaker_order::OrderError;
use mealmaker_partner::PartnerError;
use mealmaker_store::StoreError;
use serde_json::json;

const INTERNAL_MESSAGE: &str = "Ocorreu um erro inesperado";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidToken(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn invalid_id() -> Self {
        ApiError::BadRequest("Formato de ID inválido".to_string())
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidToken(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        let body = Json(json!({
            "status_code": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        ApiError::BadRequest("Algo está errado com o body da requisição".to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Upload inválido: {}", err.body_text()))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::MissingAuthorization
            | AuthError::MalformedAuthorization
            | AuthError::InvalidToken => ApiError::InvalidToken(err.to_string()),
            AuthError::Store(inner) => inner.into(),
            AuthError::Hashing(_) | AuthError::Issue(_) => ApiError::InternalError(err.to_string()),
            AuthError::Validation(_)
            | AuthError::InvalidId
            | AuthError::PhoneTaken
            | AuthError::UnknownPhone
            | AuthError::InvalidCredentials => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<PartnerError> for ApiError {
    fn from(err: PartnerError) -> Self {
        match err {
            PartnerError::Validation(_) | PartnerError::InvalidId => {
                ApiError::BadRequest(err.to_string())
            }
            PartnerError::PartnerNotFound
            | PartnerError::DishNotFound
            | PartnerError::AccompanimentNotFound => ApiError::NotFound(err.to_string()),
            PartnerError::Store(inner) => inner.into(),
        }
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Validation(_) => ApiError::BadRequest(err.to_string()),
            DeliveryError::NotFound => ApiError::NotFound(err.to_string()),
            DeliveryError::Store(inner) => inner.into(),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidId => ApiError::BadRequest(err.to_string()),
            OrderError::UserNotFound
            | OrderError::OrderNotFound
            | OrderError::DeliveryNotFound(_) => ApiError::NotFound(err.to_string()),
            OrderError::Delivery(inner) => inner.into(),
            OrderError::Store(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (status, body) = render(AuthError::InvalidToken.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status_code"], 400);

        let (status, _) = render(OrderError::UserNotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = render(ApiError::InternalError("pool exhausted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }
}
