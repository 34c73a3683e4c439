use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Item, NewOrder, Order, OrderId, Result, StoreError, store::OrderRepository};

/// One order row together with its item rows, in insertion order.
#[derive(Debug, Clone)]
struct OrderRow {
    customer_name: String,
    ordered_at: String,
    items: Vec<Item>,
}

impl OrderRow {
    fn to_order(&self, order_id: OrderId) -> Order {
        Order {
            id: order_id,
            customer_name: self.customer_name.clone(),
            ordered_at: self.ordered_at.clone(),
            items: self.items.clone(),
        }
    }
}

/// Table contents.
///
/// A write builds the complete replacement row for the one order it touches
/// and only then stores it, so a failing item insert leaves the tables as
/// they were.
#[derive(Debug, Default)]
struct Tables {
    orders: BTreeMap<OrderId, OrderRow>,
    next_order_id: i64,
    fail_on_item_code: Option<String>,
}

impl Tables {
    /// Stages the item rows of one write, failing like a rejected insert.
    fn stage_items(&self, items: &[Item]) -> Result<Vec<Item>> {
        let mut staged = Vec::with_capacity(items.len());
        for item in items {
            if self.fail_on_item_code.as_deref() == Some(item.item_code.as_str()) {
                return Err(StoreError::Backend(format!(
                    "injected failure inserting item {}",
                    item.item_code
                )));
            }
            staged.push(item.clone());
        }
        Ok(staged)
    }
}

/// In-memory order store for tests and database-less runs.
///
/// Identifiers are assigned sequentially starting at 1, like a fresh
/// `BIGSERIAL` column.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert of an item with this code fail.
    ///
    /// The write that hits it is dropped whole, order row included, which is
    /// what atomicity tests need.
    pub async fn fail_on_item_code(&self, item_code: impl Into<String>) {
        self.tables.write().await.fail_on_item_code = Some(item_code.into());
    }

    /// Removes a failure installed with [`fail_on_item_code`](Self::fail_on_item_code).
    pub async fn clear_failure(&self) {
        self.tables.write().await.fail_on_item_code = None;
    }

    /// Returns the number of order rows.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns the number of item rows across all orders.
    pub async fn item_count(&self) -> usize {
        self.tables
            .read()
            .await
            .orders
            .values()
            .map(|row| row.items.len())
            .sum()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut tables = self.tables.write().await;
        let items = tables.stage_items(&order.items)?;

        tables.next_order_id += 1;
        let order_id = OrderId::new(tables.next_order_id);
        tables.orders.insert(
            order_id,
            OrderRow {
                customer_name: order.customer_name,
                ordered_at: order.ordered_at,
                items,
            },
        );
        Ok(order_id)
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let mut tables = self.tables.write().await;
        let items = tables.stage_items(&order.items)?;

        match tables.orders.get_mut(&order.id) {
            Some(row) => {
                row.customer_name = order.customer_name.clone();
                row.ordered_at = order.ordered_at.clone();
                row.items = items;
                Ok(())
            }
            // Updating zero rows is fine, inserting items for them is not.
            None if items.is_empty() => Ok(()),
            None => Err(StoreError::Backend(format!(
                "item references missing order {}",
                order.id
            ))),
        }
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        let tables = self.tables.read().await;
        tables
            .orders
            .get(&order_id)
            .map(|row| row.to_order(order_id))
            .ok_or(StoreError::OrderNotFound(order_id))
    }

    async fn get_orders(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .map(|(order_id, row)| row.to_order(*order_id))
            .collect())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        self.tables.write().await.orders.remove(&order_id);
        Ok(())
    }

    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.tables.read().await.orders.contains_key(&order_id))
    }
}
