//! Order operations.

mod service;

pub use service::OrderService;
