use std::time::Duration;

use axum::{
    http::{header, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod handlers;
pub mod images;
pub mod middleware;
pub mod models;

use handlers::{
    accompaniments_router, deliveries_router, dishes_router, health_router, menus_router,
    orders_router, partners_router, users_router, ApiDoc, AppState,
};

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60))
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(health_router())
        .merge(users_router(state.clone()))
        .merge(partners_router())
        .merge(orders_router())
        .merge(dishes_router())
        .merge(accompaniments_router())
        .merge(menus_router())
        .merge(deliveries_router());

    let images = ServeDir::new(state.images.dir());

    Router::new()
        .nest("/api", api)
        .nest_service("/images", images)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}
