use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USERS: &str = "Users";

/// Partner affiliation given to every self-registered user.
pub const DEFAULT_PARTNER_ID: i64 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Address {
    pub cep: String,
    pub reference: String,
    pub city: String,
    pub complement: String,
    pub street: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Partner,
    Admin,
}

impl Role {
    pub fn audience(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Partner => "partner",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone_number: String,
    /// Encoded credential, see [`crate::PasswordScheme`].
    pub password: String,
    #[serde(default = "default_partner_id")]
    pub partner_id: i64,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_partner_id() -> i64 {
    DEFAULT_PARTNER_ID
}
