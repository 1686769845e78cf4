use std::path::PathBuf;
use std::sync::Arc;

use chrono::TimeDelta;
use clap::Args;
use mealmaker_auth::{PasswordScheme, TokenIssuer, UserService};
use mealmaker_delivery::DeliveryService;
use mealmaker_order::OrderService;
use mealmaker_partner::{CatalogService, PartnerService};
use mealmaker_store::{MemoryStore, PgStore, SharedStore, DEFAULT_DATABASE};

use crate::handlers::AppState;
use crate::images::ImageStore;

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Logical database name; documents of different names never mix
    #[arg(long, env = "DOCUMENT_DATABASE", default_value = DEFAULT_DATABASE)]
    pub document_database: String,

    /// Keep everything in process memory
    #[arg(long, default_value_t = false)]
    pub in_memory: bool,
}

impl StoreArgs {
    pub async fn open(&self) -> Result<SharedStore, Box<dyn std::error::Error>> {
        if self.in_memory {
            tracing::warn!("using the in-memory store; data is lost on exit");
            return Ok(Arc::new(MemoryStore::new()));
        }
        let url = self
            .database_url
            .clone()
            .ok_or("DATABASE_URL must be set unless --in-memory is given")?;
        let store = PgStore::new(url, self.document_database.clone());
        store.run_migrations().await?;
        tracing::info!(namespace = store.namespace(), "document store ready");
        Ok(Arc::new(store))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens
    #[arg(long, env = "TOKEN_TTL_SECONDS", default_value_t = 3600)]
    pub token_ttl_seconds: i64,

    /// `expires_in` reported by sign-in
    #[arg(long, env = "SESSION_EXPIRES_IN_SECONDS", default_value_t = 2_592_000)]
    pub session_expires_in_seconds: i64,

    /// legacy-base64 or argon2
    #[arg(long, env = "PASSWORD_SCHEME", default_value = "legacy-base64")]
    pub password_scheme: PasswordScheme,

    #[arg(long, env = "IMAGE_DIR", default_value = "./images")]
    pub image_dir: PathBuf,

    /// Prefix of the URLs returned for uploaded images
    #[arg(long, env = "IMAGE_PUBLIC_URL", default_value = "/images")]
    pub image_public_url: String,

    #[arg(long, env = "FUNCTIONS_CUSTOMHANDLER_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServeArgs {
    pub fn token_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.token_ttl_seconds)
    }

    pub fn session_expires_in(&self) -> TimeDelta {
        TimeDelta::seconds(self.session_expires_in_seconds)
    }
}

/// Everything the handlers need, wired over one store.
pub struct Settings {
    pub jwt_secret: Vec<u8>,
    pub token_ttl: TimeDelta,
    pub session_expires_in: TimeDelta,
    pub password_scheme: PasswordScheme,
    pub images: ImageStore,
}

impl From<&ServeArgs> for Settings {
    fn from(args: &ServeArgs) -> Self {
        Settings {
            jwt_secret: args.jwt_secret.as_bytes().to_vec(),
            token_ttl: args.token_ttl(),
            session_expires_in: args.session_expires_in(),
            password_scheme: args.password_scheme,
            images: ImageStore::new(&args.image_dir, args.image_public_url.clone()),
        }
    }
}

pub fn build_state(store: SharedStore, settings: Settings) -> AppState {
    let tokens = Arc::new(TokenIssuer::new(&settings.jwt_secret, settings.token_ttl));
    let catalog = CatalogService::new(store.clone());
    let deliveries = DeliveryService::new(store.clone());

    AppState {
        users: UserService::new(
            store.clone(),
            tokens,
            settings.password_scheme,
            settings.session_expires_in,
        ),
        partners: PartnerService::new(store.clone(), catalog.clone()),
        orders: OrderService::new(store, deliveries.clone()),
        catalog,
        deliveries,
        images: settings.images,
    }
}
