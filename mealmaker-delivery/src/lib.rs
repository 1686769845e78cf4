pub mod error;
pub mod models;
pub mod service;

pub use error::DeliveryError;
pub use models::{Delivery, DELIVERIES};
pub use service::{DeliveryService, DeliveryUpdate, NewDelivery};
