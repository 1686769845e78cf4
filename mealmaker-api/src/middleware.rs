use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use mealmaker_auth::{extract_bearer, AuthError};

use crate::error::ApiError;
use crate::handlers::AppState;

/// Rejects the request unless it carries a valid `Bearer` token. The verified
/// [`Claims`](mealmaker_auth::Claims) are left in the request extensions for
/// handlers that check ownership.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| ApiError::from(AuthError::MalformedAuthorization))?,
        ),
        None => None,
    };

    let token = extract_bearer(header)?;
    let claims = state.users.verify_token(token).map_err(|err| {
        tracing::debug!(error = %err, "bearer rejected");
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
