pub mod error;
pub mod models;
pub mod service;

pub use error::OrderError;
pub use models::{
    LineAccompaniment, Order, OrderLine, OrderStatus, OrderView, UserSnapshot, ORDERS,
};
pub use service::{NewOrder, OrderService};
