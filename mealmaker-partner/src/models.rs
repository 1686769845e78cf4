use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PARTNERS: &str = "Partners";
pub const DISHES: &str = "Dishes";
pub const ACCOMPANIMENTS: &str = "Accompaniments";
pub const MENUS: &str = "Menus";

/// Sequence backing numeric partner ids.
pub const PARTNER_SEQUENCE: &str = "partners";

/// One weekly opening window. Times are "HH:MM" on a 24-hour clock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Partner {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cnpj: String,
    pub partner_id: i64,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub delivery_fee: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub serves: i32,
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub max_accompaniments_count: i32,
    /// Ids of selectable accompaniments.
    #[serde(default)]
    pub accompaniments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accompaniment {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Menus hold dish snapshots taken when the menu was created; later dish
/// edits or deletions do not reach them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Menu {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub small_description: String,
    pub partner_id: i64,
    #[serde(default)]
    pub dishes: Vec<Dish>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
