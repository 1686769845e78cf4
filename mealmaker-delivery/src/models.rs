use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DELIVERIES: &str = "Deliveries";

pub(crate) const DELIVERY_SEQUENCE: &str = "deliveries";

/// A delivery person. Orders refer to it by `_id`, with 0 meaning unassigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
