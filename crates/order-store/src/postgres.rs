use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction};

use crate::{Item, NewOrder, Order, OrderId, Result, StoreError, store::OrderRepository};

/// PostgreSQL-backed order store.
///
/// Orders live in the `orders` table and their items in `items`, linked by
/// `items.order_id`. Every write runs in a single transaction.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool and wraps it in a store.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `orders` and `items` tables if they do not exist yet.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Closes every connection in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Starts a read-only transaction that sees one consistent snapshot, so
    /// an order and its items are never read from different commits.
    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn insert_items(conn: &mut PgConnection, order_id: OrderId, items: &[Item]) -> Result<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO items (item_code, description, quantity, order_id)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&item.item_code)
            .bind(&item.description)
            .bind(i64::from(item.quantity))
            .bind(order_id.as_i64())
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn fetch_items(conn: &mut PgConnection, order_id: OrderId) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT item_code, description, quantity
            FROM items
            WHERE order_id = $1
            ORDER BY item_id ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    fn row_to_item(row: &PgRow) -> Result<Item> {
        let quantity: i64 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity)
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Item {
            item_code: row.try_get("item_code")?,
            description: row.try_get("description")?,
            quantity,
        })
    }

    fn row_to_order(row: &PgRow, items: Vec<Item>) -> Result<Order> {
        Ok(Order {
            id: OrderId::new(row.try_get("order_id")?),
            customer_name: row.try_get("customer_name")?,
            ordered_at: row.try_get("ordered_at")?,
            items,
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut tx = self.pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (customer_name, ordered_at)
            VALUES ($1, $2)
            RETURNING order_id
            "#,
        )
        .bind(&order.customer_name)
        .bind(&order.ordered_at)
        .fetch_one(&mut *tx)
        .await?;
        let order_id = OrderId::new(order_id);

        Self::insert_items(&mut *tx, order_id, &order.items).await?;

        tx.commit().await?;
        tracing::debug!(%order_id, items = order.items.len(), "order inserted");
        Ok(order_id)
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET customer_name = $2, ordered_at = $3
            WHERE order_id = $1
            "#,
        )
        .bind(order.id.as_i64())
        .bind(&order.customer_name)
        .bind(&order.ordered_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let removed = sqlx::query("DELETE FROM items WHERE order_id = $1")
            .bind(order.id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        Self::insert_items(&mut *tx, order.id, &order.items).await?;

        tx.commit().await?;
        tracing::debug!(
            order_id = %order.id,
            updated,
            removed,
            inserted = order.items.len(),
            "order items replaced"
        );
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        let mut tx = self.begin_snapshot().await?;

        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT order_id, customer_name, ordered_at
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or(StoreError::OrderNotFound(order_id))?;
        let items = Self::fetch_items(&mut *tx, order_id).await?;
        let order = Self::row_to_order(&row, items)?;

        tx.commit().await?;
        Ok(order)
    }

    async fn get_orders(&self) -> Result<Vec<Order>> {
        let mut tx = self.begin_snapshot().await?;

        let order_rows = sqlx::query(
            r#"
            SELECT order_id, customer_name, ordered_at
            FROM orders
            ORDER BY order_id ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        if order_rows.is_empty() {
            tx.commit().await?;
            return Ok(Vec::new());
        }

        // Load the items of every order in one query instead of one per order.
        let ids = order_rows
            .iter()
            .map(|row| row.try_get::<i64, _>("order_id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let item_rows = sqlx::query(
            r#"
            SELECT order_id, item_code, description, quantity
            FROM items
            WHERE order_id = ANY($1)
            ORDER BY item_id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut items_by_order: HashMap<i64, Vec<Item>> = HashMap::new();
        for row in &item_rows {
            let order_id: i64 = row.try_get("order_id")?;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }

        order_rows
            .iter()
            .zip(ids)
            .map(|(row, id)| {
                let items = items_by_order.remove(&id).unwrap_or_default();
                Self::row_to_order(row, items)
            })
            .collect()
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let items = sqlx::query("DELETE FROM items WHERE order_id = $1")
            .bind(order_id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let orders = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        tracing::debug!(%order_id, orders, items, "order deleted");
        Ok(())
    }

    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_id = $1")
            .bind(order_id.as_i64())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}
