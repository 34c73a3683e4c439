//! Transactional persistence for order aggregates.
//!
//! An order and the items it owns are stored as separate rows but always
//! written, replaced and removed together. [`OrderRepository`] is the seam
//! the order service depends on; [`PostgresOrderStore`] is the relational
//! implementation and [`InMemoryOrderStore`] a drop-in fake.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{Item, NewOrder, Order, OrderId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::OrderRepository;
