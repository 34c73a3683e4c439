//! Order service providing the transport-facing API for order operations.

use common::{NewOrder, Order, OrderId};
use order_store::OrderRepository;

use crate::error::{DomainError, Result};

/// Service for managing orders.
///
/// Reads and mutations of a single order first ask the store whether the
/// order exists and fail with [`DomainError::NotFound`] if it does not.
/// The check and the operation it guards are separate store calls, so an
/// order deleted in between is not detected here.
pub struct OrderService<S: OrderRepository> {
    store: S,
}

impl<S: OrderRepository> OrderService<S> {
    /// Creates a new order service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an order with its items and returns the assigned identifier.
    #[tracing::instrument(skip(self, order), fields(customer = %order.customer_name, items = order.items.len()))]
    pub async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        let order_id = self.store.create_order(order).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, "order created");
        Ok(order_id)
    }

    /// Loads an order with its items.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.ensure_exists(order_id).await?;
        Ok(self.store.get_order(order_id).await?)
    }

    /// Replaces an order's fields and its whole item set.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, items = order.items.len()))]
    pub async fn update_order(&self, order: Order) -> Result<()> {
        self.ensure_exists(order.id).await?;
        self.store.update_order(&order).await?;
        metrics::counter!("orders_updated_total").increment(1);
        tracing::info!("order updated");
        Ok(())
    }

    /// Loads every order.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<Vec<Order>> {
        let orders = self.store.get_orders().await?;
        tracing::debug!(count = orders.len(), "orders loaded");
        Ok(orders)
    }

    /// Deletes an order and its items.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        self.ensure_exists(order_id).await?;
        self.store.delete_order(order_id).await?;
        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!("order deleted");
        Ok(())
    }

    async fn ensure_exists(&self, order_id: OrderId) -> Result<()> {
        if self.store.order_exists(order_id).await? {
            return Ok(());
        }
        metrics::counter!("orders_not_found_total").increment(1);
        tracing::warn!(%order_id, "order not found");
        Err(DomainError::NotFound(order_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use common::Item;
    use order_store::{InMemoryOrderStore, StoreError};

    use super::*;

    /// Wraps the in-memory store and records which operations reached it.
    #[derive(Clone, Default)]
    struct RecordingStore {
        inner: InMemoryOrderStore,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RecordingStore {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderRepository for RecordingStore {
        async fn create_order(&self, order: NewOrder) -> order_store::Result<OrderId> {
            self.record("create_order");
            self.inner.create_order(order).await
        }

        async fn update_order(&self, order: &Order) -> order_store::Result<()> {
            self.record("update_order");
            self.inner.update_order(order).await
        }

        async fn get_order(&self, order_id: OrderId) -> order_store::Result<Order> {
            self.record("get_order");
            self.inner.get_order(order_id).await
        }

        async fn get_orders(&self) -> order_store::Result<Vec<Order>> {
            self.record("get_orders");
            self.inner.get_orders().await
        }

        async fn delete_order(&self, order_id: OrderId) -> order_store::Result<()> {
            self.record("delete_order");
            self.inner.delete_order(order_id).await
        }

        async fn order_exists(&self, order_id: OrderId) -> order_store::Result<bool> {
            self.record("order_exists");
            self.inner.order_exists(order_id).await
        }
    }

    /// A store whose backend is unreachable.
    struct FailingStore;

    #[async_trait]
    impl OrderRepository for FailingStore {
        async fn create_order(&self, _order: NewOrder) -> order_store::Result<OrderId> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn update_order(&self, _order: &Order) -> order_store::Result<()> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn get_order(&self, _order_id: OrderId) -> order_store::Result<Order> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn get_orders(&self) -> order_store::Result<Vec<Order>> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn delete_order(&self, _order_id: OrderId) -> order_store::Result<()> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn order_exists(&self, _order_id: OrderId) -> order_store::Result<bool> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    fn alice_order() -> NewOrder {
        NewOrder::new("Alice", "2024-01-01").with_item(Item::new("A1", "Widget", 2))
    }

    #[tokio::test]
    async fn test_create_order_skips_existence_check() {
        let store = RecordingStore::default();
        let service = OrderService::new(store.clone());

        let order_id = service.create_order(alice_order()).await.unwrap();

        assert_eq!(order_id, OrderId::new(1));
        assert_eq!(store.calls(), vec!["create_order"]);
    }

    #[tokio::test]
    async fn test_get_order() {
        let store = RecordingStore::default();
        let service = OrderService::new(store.clone());
        let order_id = service.create_order(alice_order()).await.unwrap();

        let order = service.get_order(order_id).await.unwrap();

        assert_eq!(order, alice_order().with_id(order_id));
        assert_eq!(
            store.calls(),
            vec!["create_order", "order_exists", "get_order"]
        );
    }

    #[tokio::test]
    async fn test_get_missing_order_stops_after_check() {
        let store = RecordingStore::default();
        let service = OrderService::new(store.clone());

        let err = service.get_order(OrderId::new(5)).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound(id) if id == OrderId::new(5)));
        assert_eq!(err.to_string(), "order not found");
        assert_eq!(store.calls(), vec!["order_exists"]);
    }

    #[tokio::test]
    async fn test_update_missing_order_is_rejected() {
        let store = RecordingStore::default();
        let service = OrderService::new(store.clone());

        let err = service
            .update_order(alice_order().with_id(OrderId::new(9)))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.calls(), vec!["order_exists"]);
        assert_eq!(store.inner.order_count().await, 0);
        assert_eq!(store.inner.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_order_replaces_items() {
        let service = OrderService::new(InMemoryOrderStore::new());
        let order_id = service.create_order(alice_order()).await.unwrap();

        let updated = NewOrder::new("Alice", "2024-01-02")
            .with_item(Item::new("B2", "Gadget", 5))
            .with_id(order_id);
        service.update_order(updated.clone()).await.unwrap();

        assert_eq!(service.get_order(order_id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_delete_missing_order_is_rejected() {
        let store = RecordingStore::default();
        let service = OrderService::new(store.clone());
        service.create_order(alice_order()).await.unwrap();

        let err = service.delete_order(OrderId::new(2)).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.calls(), vec!["create_order", "order_exists"]);
        assert_eq!(store.inner.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let service = OrderService::new(InMemoryOrderStore::new());
        let order_id = service.create_order(alice_order()).await.unwrap();

        service.delete_order(order_id).await.unwrap();
        let err = service.delete_order(order_id).await.unwrap_err();

        assert!(err.is_not_found());
        // The store itself still accepts the repeated delete.
        assert!(service.store().delete_order(order_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_orders_is_passthrough() {
        let store = RecordingStore::default();
        let service = OrderService::new(store.clone());

        let orders = service.get_orders().await.unwrap();

        assert!(orders.is_empty());
        assert_eq!(store.calls(), vec!["get_orders"]);
    }

    #[tokio::test]
    async fn test_store_failures_surface_as_store_errors() {
        let service = OrderService::new(FailingStore);

        assert!(matches!(
            service.create_order(alice_order()).await,
            Err(DomainError::Store(StoreError::Backend(_)))
        ));
        assert!(matches!(
            service.get_order(OrderId::new(1)).await,
            Err(DomainError::Store(_))
        ));
        assert!(matches!(
            service.update_order(alice_order().with_id(OrderId::new(1))).await,
            Err(DomainError::Store(_))
        ));
        assert!(matches!(
            service.get_orders().await,
            Err(DomainError::Store(_))
        ));
        assert!(matches!(
            service.delete_order(OrderId::new(1)).await,
            Err(DomainError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_store_not_found_maps_to_domain_not_found() {
        let err: DomainError = StoreError::OrderNotFound(OrderId::new(3)).into();
        assert!(matches!(err, DomainError::NotFound(id) if id == OrderId::new(3)));
    }
}
