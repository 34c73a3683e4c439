//! Types shared by the store, the order service and the HTTP API.

pub mod order;
pub mod types;

pub use order::{Item, NewOrder, Order};
pub use types::{OrderId, ParseOrderIdError};
