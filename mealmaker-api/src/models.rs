use chrono::{DateTime, Utc};
use mealmaker_auth::{Address, Session, User};
use mealmaker_delivery::Delivery;
use mealmaker_order::{LineAccompaniment, Order, OrderLine, OrderView, UserSnapshot};
use mealmaker_partner::{Accompaniment, Dish, Menu, Partner, Schedule, Storefront};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// HTTP status code, repeated in the body
    pub status_code: u16,
    /// Human readable reason
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub status_code: u16,
    pub message: String,
}

impl MessageResponse {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

// Users

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AddressBody {
    pub cep: String,
    pub reference: String,
    pub city: String,
    pub complement: String,
    pub street: String,
}

impl From<AddressBody> for Address {
    fn from(body: AddressBody) -> Self {
        Address {
            cep: body.cep,
            reference: body.reference,
            city: body.city,
            complement: body.complement,
            street: body.street,
        }
    }
}

impl From<Address> for AddressBody {
    fn from(address: Address) -> Self {
        AddressBody {
            cep: address.cep,
            reference: address.reference,
            city: address.city,
            complement: address.complement,
            street: address.street,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    /// At least 6 characters
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub address: AddressBody,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub new_password: String,
}

/// User as returned to clients; the stored credential is never included.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub partner_id: i64,
    pub address: AddressBody,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            phone_number: user.phone_number,
            partner_id: user.partner_id,
            address: user.address.into(),
            role: user.role.audience().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignUpResponse {
    pub status_code: u16,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignInResponse {
    pub status_code: u16,
    #[serde(rename = "_id")]
    pub id: String,
    /// `Bearer <jwt>`, ready to be sent back in the Authorization header
    pub access_token: String,
    pub name: String,
    pub phone_number: String,
    pub partner_id: i64,
    /// Session lifetime in seconds
    pub expires_in: i64,
}

impl From<Session> for SignInResponse {
    fn from(session: Session) -> Self {
        SignInResponse {
            status_code: 200,
            id: session.user_id,
            access_token: session.access_token,
            name: session.name,
            phone_number: session.phone_number,
            partner_id: session.partner_id,
            expires_in: session.expires_in,
        }
    }
}

// Partners

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleBody {
    /// English weekday name, e.g. "Monday"
    pub day_of_week: String,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
}

impl From<ScheduleBody> for Schedule {
    fn from(body: ScheduleBody) -> Self {
        Schedule {
            day_of_week: body.day_of_week,
            start_time: body.start_time,
            end_time: body.end_time,
        }
    }
}

impl From<Schedule> for ScheduleBody {
    fn from(schedule: Schedule) -> Self {
        ScheduleBody {
            day_of_week: schedule.day_of_week,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreatePartnerRequest {
    pub name: String,
    pub cnpj: String,
    pub logo: String,
    pub schedules: Vec<ScheduleBody>,
    pub delivery_fee: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartnerResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub cnpj: String,
    pub partner_id: i64,
    pub logo: String,
    pub schedules: Vec<ScheduleBody>,
    pub delivery_fee: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Partner> for PartnerResponse {
    fn from(partner: Partner) -> Self {
        PartnerResponse {
            id: partner.id,
            name: partner.name,
            cnpj: partner.cnpj,
            partner_id: partner.partner_id,
            logo: partner.logo,
            schedules: partner.schedules.into_iter().map(Into::into).collect(),
            delivery_fee: partner.delivery_fee,
            created_at: partner.created_at,
            updated_at: partner.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StorefrontResponse {
    pub name: String,
    pub cnpj: String,
    pub partner_id: i64,
    pub logo: String,
    pub delivery_fee: f64,
    pub is_open: bool,
    pub schedules: Vec<ScheduleBody>,
    pub dishes: Vec<DishResponse>,
    pub accompaniments: Vec<AccompanimentResponse>,
}

impl From<Storefront> for StorefrontResponse {
    fn from(front: Storefront) -> Self {
        StorefrontResponse {
            name: front.name,
            cnpj: front.cnpj,
            partner_id: front.partner_id,
            logo: front.logo,
            delivery_fee: front.delivery_fee,
            is_open: front.is_open,
            schedules: front.schedules.into_iter().map(Into::into).collect(),
            dishes: front.dishes.into_iter().map(Into::into).collect(),
            accompaniments: front.accompaniments.into_iter().map(Into::into).collect(),
        }
    }
}

// Catalog

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct DishRequest {
    /// Required, at most 50 characters
    pub title: String,
    /// Required, greater than zero
    pub price: f64,
    /// At most 200 characters
    pub description: String,
    pub serves: i32,
    pub img_url: String,
    /// Defaults to true
    pub active: Option<bool>,
    pub max_accompaniments_count: i32,
    /// Accompaniment ids
    pub accompaniments: Vec<String>,
}

/// Only the fields present are written.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct DishPatchRequest {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub serves: Option<i32>,
    pub img_url: Option<String>,
    pub active: Option<bool>,
    pub max_accompaniments_count: Option<i32>,
    pub accompaniments: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DishResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub serves: i32,
    pub img_url: String,
    pub active: bool,
    pub max_accompaniments_count: i32,
    pub accompaniments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Dish> for DishResponse {
    fn from(dish: Dish) -> Self {
        DishResponse {
            id: dish.id,
            title: dish.title,
            price: dish.price,
            description: dish.description,
            serves: dish.serves,
            img_url: dish.img_url,
            active: dish.active,
            max_accompaniments_count: dish.max_accompaniments_count,
            accompaniments: dish.accompaniments,
            created_at: dish.created_at,
            updated_at: dish.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateDishResponse {
    pub status_code: u16,
    pub message: String,
    pub dish: DishResponse,
}

/// Multipart form accepted by the image upload.
#[derive(ToSchema)]
pub struct ImageUploadForm {
    /// Any file whose name carries an extension
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub status_code: u16,
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AccompanimentRequest {
    pub title: String,
    pub category: String,
    pub price: f64,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AccompanimentUpsertRequest {
    /// Existing id to update; omitted ids are inserted
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccompanimentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Accompaniment> for AccompanimentResponse {
    fn from(accompaniment: Accompaniment) -> Self {
        AccompanimentResponse {
            id: accompaniment.id,
            title: accompaniment.title,
            category: accompaniment.category,
            price: accompaniment.price,
            active: accompaniment.active,
            created_at: accompaniment.created_at,
            updated_at: accompaniment.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateAccompanimentsResponse {
    pub status_code: u16,
    pub accompaniments: Vec<AccompanimentResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpsertAccompanimentsResponse {
    pub status_code: u16,
    pub inserted: u64,
    pub updated: u64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct MenuRequest {
    pub name: String,
    pub small_description: String,
    pub partner_id: i64,
    /// Dish ids, copied into the menu in this order
    pub dishes: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub small_description: String,
    pub partner_id: i64,
    pub dishes: Vec<DishResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Menu> for MenuResponse {
    fn from(menu: Menu) -> Self {
        MenuResponse {
            id: menu.id,
            name: menu.name,
            small_description: menu.small_description,
            partner_id: menu.partner_id,
            dishes: menu.dishes.into_iter().map(Into::into).collect(),
            created_at: menu.created_at,
            updated_at: menu.updated_at,
        }
    }
}

// Orders

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LineAccompanimentBody {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct OrderLineBody {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub price: f64,
    pub observation: String,
    pub quantity: i32,
    pub accompaniments: Vec<LineAccompanimentBody>,
}

impl From<OrderLineBody> for OrderLine {
    fn from(body: OrderLineBody) -> Self {
        OrderLine {
            id: body.id,
            title: body.title,
            price: body.price,
            observation: body.observation,
            quantity: body.quantity,
            accompaniments: body
                .accompaniments
                .into_iter()
                .map(|a| LineAccompaniment {
                    id: a.id,
                    title: a.title,
                    category: a.category,
                })
                .collect(),
        }
    }
}

impl From<OrderLine> for OrderLineBody {
    fn from(line: OrderLine) -> Self {
        OrderLineBody {
            id: line.id,
            title: line.title,
            price: line.price,
            observation: line.observation,
            quantity: line.quantity,
            accompaniments: line
                .accompaniments
                .into_iter()
                .map(|a| LineAccompanimentBody {
                    id: a.id,
                    title: a.title,
                    category: a.category,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateOrderRequest {
    /// Defaults to partner 1
    pub partner_id: i64,
    pub dishes: Vec<OrderLineBody>,
    pub payment_type: String,
    pub delivery_type: String,
    /// Stored as sent
    pub quantity_total: i32,
    /// Stored as sent
    pub total: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    /// 0 sent, 1 confirmed, 2 out for delivery, 3 delivered
    pub status: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderQuery {
    pub delivery_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSnapshotBody {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub address: AddressBody,
}

impl From<UserSnapshot> for UserSnapshotBody {
    fn from(user: UserSnapshot) -> Self {
        UserSnapshotBody {
            id: user.id,
            name: user.name,
            phone_number: user.phone_number,
            address: user.address.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user: UserSnapshotBody,
    pub partner_id: i64,
    pub dishes: Vec<OrderLineBody>,
    pub status: i64,
    pub payment_type: String,
    pub delivery_id: i64,
    pub delivery_type: String,
    pub quantity_total: i32,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            user: order.user.into(),
            partner_id: order.partner_id,
            dishes: order.dishes.into_iter().map(Into::into).collect(),
            status: order.status.code(),
            payment_type: order.payment_type,
            delivery_id: order.delivery_id,
            delivery_type: order.delivery_type,
            quantity_total: order.quantity_total,
            total: order.total,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub status_code: u16,
    pub order: OrderResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderViewResponse {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user: UserSnapshotBody,
    pub partner_id: i64,
    pub dishes: Vec<OrderLineBody>,
    /// Portuguese status label
    pub status: String,
    pub payment_type: String,
    pub delivery: Option<DeliveryResponse>,
    pub delivery_type: String,
    pub quantity_total: i32,
    pub total: f64,
    /// "YYYY-MM-DD HH:MM:SS", server local time
    pub created_at: String,
}

impl From<OrderView> for OrderViewResponse {
    fn from(view: OrderView) -> Self {
        OrderViewResponse {
            id: view.id,
            user: view.user.into(),
            partner_id: view.partner_id,
            dishes: view.dishes.into_iter().map(Into::into).collect(),
            status: view.status,
            payment_type: view.payment_type,
            delivery: view.delivery.map(Into::into),
            delivery_type: view.delivery_type,
            quantity_total: view.quantity_total,
            total: view.total,
            created_at: view.created_at,
        }
    }
}

// Deliveries

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct DeliveryRequest {
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryResponse {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Delivery> for DeliveryResponse {
    fn from(delivery: Delivery) -> Self {
        DeliveryResponse {
            id: delivery.id,
            name: delivery.name,
            phone_number: delivery.phone_number,
            created_at: delivery.created_at,
            updated_at: delivery.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateDeliveryResponse {
    pub status_code: u16,
    pub delivery: DeliveryResponse,
}
