use async_trait::async_trait;

use crate::{NewOrder, Order, OrderId, Result};

/// Core trait for order aggregate persistence.
///
/// An order and its items are always written together: every mutating
/// method is atomic, so a failure part-way through leaves the previously
/// persisted state untouched. Implementations must be thread-safe.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new order and all of its items.
    ///
    /// Returns the identifier assigned by the store.
    async fn create_order(&self, order: NewOrder) -> Result<OrderId>;

    /// Overwrites the order's fields and replaces its whole item set.
    ///
    /// Existing items are deleted and the new ones inserted; items are never
    /// diffed. Whether the order exists is the caller's concern.
    async fn update_order(&self, order: &Order) -> Result<()>;

    /// Loads one order with its items.
    ///
    /// Fails with `OrderNotFound` if no order row matches.
    async fn get_order(&self, order_id: OrderId) -> Result<Order>;

    /// Loads every order with its items, in identifier order.
    async fn get_orders(&self) -> Result<Vec<Order>>;

    /// Deletes the order's items and then the order itself.
    ///
    /// Deleting an order that does not exist succeeds.
    async fn delete_order(&self, order_id: OrderId) -> Result<()>;

    /// Checks whether an order row exists without loading its items.
    async fn order_exists(&self, order_id: OrderId) -> Result<bool>;
}

#[async_trait]
impl<T: OrderRepository + ?Sized> OrderRepository for std::sync::Arc<T> {
    async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        (**self).create_order(order).await
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        (**self).update_order(order).await
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        (**self).get_order(order_id).await
    }

    async fn get_orders(&self) -> Result<Vec<Order>> {
        (**self).get_orders().await
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        (**self).delete_order(order_id).await
    }

    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        (**self).order_exists(order_id).await
    }
}
