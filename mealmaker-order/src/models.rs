use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use mealmaker_auth::{Address, User};
use mealmaker_delivery::Delivery;
use mealmaker_store::codec::format_display;
use serde::{Deserialize, Serialize};

pub const ORDERS: &str = "Orders";

pub(crate) const ORDER_SEQUENCE: &str = "orders";

/// Stored as its integer code. Codes outside 0..=3 are kept as-is; no
/// transition order is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum OrderStatus {
    Sent,
    Confirmed,
    OutForDelivery,
    Delivered,
    Unrecognized(i64),
}

impl OrderStatus {
    pub fn code(&self) -> i64 {
        match self {
            OrderStatus::Sent => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::OutForDelivery => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Unrecognized(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Sent => "Pedido Enviado",
            OrderStatus::Confirmed => "Pedido Confirmado",
            OrderStatus::OutForDelivery => "Pedido Saiu para Entrega",
            OrderStatus::Delivered => "Pedido Entregue",
            OrderStatus::Unrecognized(_) => "Status desconhecido",
        }
    }
}

impl From<i64> for OrderStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => OrderStatus::Sent,
            1 => OrderStatus::Confirmed,
            2 => OrderStatus::OutForDelivery,
            3 => OrderStatus::Delivered,
            other => OrderStatus::Unrecognized(other),
        }
    }
}

impl From<OrderStatus> for i64 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Customer data copied into the order; credentials are left behind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSnapshot {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub address: Address,
}

impl From<&User> for UserSnapshot {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineAccompaniment {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
}

/// Dish as ordered, copied from the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub accompaniments: Vec<LineAccompaniment>,
}

/// `total` and `quantity_total` are taken from the client and never
/// recomputed against dish prices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user: UserSnapshot,
    pub partner_id: i64,
    #[serde(default)]
    pub dishes: Vec<OrderLine>,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_type: String,
    /// 0 while unassigned.
    #[serde(default)]
    pub delivery_id: i64,
    #[serde(default)]
    pub delivery_type: String,
    #[serde(default)]
    pub quantity_total: i32,
    #[serde(default)]
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing shape of an order: labelled status, joined delivery person and
/// a display-formatted creation time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderView {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user: UserSnapshot,
    pub partner_id: i64,
    pub dishes: Vec<OrderLine>,
    pub status: String,
    pub payment_type: String,
    pub delivery: Option<Delivery>,
    pub delivery_type: String,
    pub quantity_total: i32,
    pub total: f64,
    pub created_at: String,
}

impl OrderView {
    pub fn render<Tz>(order: Order, delivery: Option<Delivery>, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            id: order.id,
            status: order.status.label().to_string(),
            created_at: format_display(&order.created_at.with_timezone(tz)),
            user: order.user,
            partner_id: order.partner_id,
            dishes: order.dishes,
            payment_type: order.payment_type,
            delivery,
            delivery_type: order.delivery_type,
            quantity_total: order.quantity_total,
            total: order.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_codes_round_trip_verbatim() {
        assert_eq!(serde_json::to_value(OrderStatus::Delivered).unwrap(), json!(3));
        let odd: OrderStatus = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(odd, OrderStatus::Unrecognized(42));
        assert_eq!(serde_json::to_value(odd).unwrap(), json!(42));
        assert_eq!(OrderStatus::from(-1).code(), -1);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(OrderStatus::Sent.label(), "Pedido Enviado");
        assert_eq!(OrderStatus::Confirmed.label(), "Pedido Confirmado");
        assert_eq!(
            OrderStatus::OutForDelivery.to_string(),
            "Pedido Saiu para Entrega"
        );
        assert_eq!(OrderStatus::Delivered.label(), "Pedido Entregue");
    }
}
