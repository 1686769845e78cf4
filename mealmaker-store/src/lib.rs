pub mod codec;
pub mod collection;
pub mod document;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

pub use collection::{Collection, SharedStore};
pub use document::{Filter, Sort, Update};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{DocumentStore, UpdateResult};

pub const DEFAULT_DATABASE: &str = "meal-maker-db";
