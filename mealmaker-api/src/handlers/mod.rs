pub mod accompaniments;
pub mod deliveries;
pub mod dishes;
pub mod health;
pub mod menus;
pub mod orders;
pub mod partners;
pub mod users;

pub use accompaniments::router as accompaniments_router;
pub use deliveries::router as deliveries_router;
pub use dishes::router as dishes_router;
pub use health::router as health_router;
pub use menus::router as menus_router;
pub use orders::router as orders_router;
pub use partners::router as partners_router;
pub use users::router as users_router;

use axum::extract::FromRequest;
use mealmaker_auth::UserService;
use mealmaker_delivery::DeliveryService;
use mealmaker_order::OrderService;
use mealmaker_partner::{CatalogService, PartnerService};
use mealmaker_store::codec::parse_numeric_id;
use utoipa::OpenApi;

use crate::error::ApiError;
use crate::images::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub partners: PartnerService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub deliveries: DeliveryService,
    pub images: ImageStore,
}

/// `axum::Json` with body rejections rendered as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

fn numeric_id(raw: &str) -> Result<i64, ApiError> {
    parse_numeric_id(raw).map_err(|_| ApiError::invalid_id())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::sign_up,
        users::sign_in,
        users::update_password,
        users::list_users,
        users::get_user,
        users::update_address,
        partners::get_bff,
        partners::create_partner,
        orders::list_by_partner,
        orders::list_by_user,
        orders::create_order,
        orders::update_order,
        dishes::list_dishes,
        dishes::get_dish,
        dishes::create_dish,
        dishes::upload_image,
        dishes::update_dish,
        dishes::delete_dish,
        accompaniments::list_accompaniments,
        accompaniments::create_accompaniments,
        accompaniments::update_accompaniments,
        accompaniments::delete_accompaniment,
        menus::create_menu,
        menus::list_menus,
        deliveries::list_deliveries,
        deliveries::create_delivery,
        deliveries::update_delivery,
        deliveries::delete_delivery,
    ),
    components(
        schemas(
            crate::models::ApiErrorResponse,
            crate::models::MessageResponse,
            crate::models::AddressBody,
            crate::models::SignUpRequest,
            crate::models::SignUpResponse,
            crate::models::SignInRequest,
            crate::models::SignInResponse,
            crate::models::UpdatePasswordRequest,
            crate::models::UserResponse,
            crate::models::ScheduleBody,
            crate::models::CreatePartnerRequest,
            crate::models::PartnerResponse,
            crate::models::StorefrontResponse,
            crate::models::DishRequest,
            crate::models::DishPatchRequest,
            crate::models::DishResponse,
            crate::models::CreateDishResponse,
            crate::models::ImageUploadForm,
            crate::models::UploadImageResponse,
            crate::models::AccompanimentRequest,
            crate::models::AccompanimentUpsertRequest,
            crate::models::AccompanimentResponse,
            crate::models::CreateAccompanimentsResponse,
            crate::models::UpsertAccompanimentsResponse,
            crate::models::MenuRequest,
            crate::models::MenuResponse,
            crate::models::LineAccompanimentBody,
            crate::models::OrderLineBody,
            crate::models::CreateOrderRequest,
            crate::models::CreateOrderResponse,
            crate::models::UpdateOrderRequest,
            crate::models::UserSnapshotBody,
            crate::models::OrderResponse,
            crate::models::OrderViewResponse,
            crate::models::DeliveryRequest,
            crate::models::DeliveryResponse,
            crate::models::CreateDeliveryResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "users", description = "Sign-up, sign-in and user profile endpoints"),
        (name = "partners", description = "Partner registration and storefront"),
        (name = "orders", description = "Order placement and lifecycle"),
        (name = "dishes", description = "Dish catalog"),
        (name = "accompaniments", description = "Accompaniment catalog"),
        (name = "menus", description = "Partner menus"),
        (name = "deliveries", description = "Delivery personnel")
    ),
    info(
        title = "Meal Maker API",
        description = "Marketplace backend for partners, dishes, orders and deliveries",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::*;
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
