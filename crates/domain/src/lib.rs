//! Domain layer for the order service.
//!
//! [`OrderService`] is the operation set transports call into. It refuses to
//! read, update or delete orders that do not exist and otherwise delegates
//! to an injected [`OrderRepository`](order_store::OrderRepository).

pub mod error;
pub mod order;

pub use common::{Item, NewOrder, Order, OrderId};
pub use error::{DomainError, Result};
pub use order::OrderService;
