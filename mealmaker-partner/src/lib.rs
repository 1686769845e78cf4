pub mod availability;
pub mod catalog;
pub mod error;
pub mod models;
pub mod storefront;

pub use availability::is_open;
pub use catalog::{
    AccompanimentUpsert, CatalogService, DishPatch, NewAccompaniment, NewDish, NewMenu,
    UpsertSummary,
};
pub use error::PartnerError;
pub use models::{Accompaniment, Dish, Menu, Partner, Schedule};
pub use storefront::{NewPartner, PartnerService, Storefront};
