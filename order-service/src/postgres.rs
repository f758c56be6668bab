// ============================================================================
// ROCKET PARTS PLATFORM - POSTGRES ORDER REPOSITORY
// ============================================================================
// Module: order-service/src/postgres.rs
// Description: Production-deployment OrderRepository backed by sqlx +
//              Postgres (spec.md §6), grounded on the teacher's
//              `commerce::services::order::OrderService` transaction style
//              (single `tx.begin()` spanning the order row and its items).
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocketparts_shared::error::{Error, Result};
use rocketparts_shared::types::{Page, Pagination};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{Order, OrderItem, OrderStatus};
use crate::repository::{OrderMetrics, OrderRepository};

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    total_amount: Decimal,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    assembled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    item_id: Uuid,
    item_name: String,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

fn status_str(s: OrderStatus) -> &'static str {
    s.as_str()
}

fn parse_status(s: &str) -> Result<OrderStatus> {
    Ok(match s {
        "pending" => OrderStatus::Pending,
        "paid" => OrderStatus::Paid,
        "assembled" => OrderStatus::Assembled,
        "completed" => OrderStatus::Completed,
        "cancelled" => OrderStatus::Cancelled,
        "failed" => OrderStatus::Failed,
        other => return Err(Error::Internal(format!("unknown order status {other}"))),
    })
}

fn assemble(row: OrderRow, item_rows: Vec<OrderItemRow>) -> Result<Order> {
    Ok(Order {
        id: row.id,
        user_id: row.user_id,
        status: parse_status(&row.status)?,
        items: item_rows
            .into_iter()
            .map(|r| OrderItem {
                id: r.id,
                order_id: r.order_id,
                item_id: r.item_id,
                item_name: r.item_name,
                quantity: r.quantity,
                unit_price: r.unit_price,
                line_total: r.line_total,
            })
            .collect(),
        total_amount: row.total_amount,
        currency: row.currency,
        created_at: row.created_at,
        updated_at: row.updated_at,
        paid_at: row.paid_at,
        assembled_at: row.assembled_at,
        completed_at: row.completed_at,
        deleted_at: row.deleted_at,
    })
}

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<OrderItemRow>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, item_id, item_name, quantity, unit_price, line_total \
             FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, status, total_amount, currency, created_at, updated_at,
                 paid_at, assembled_at, completed_at, deleted_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(status_str(order.status))
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.paid_at)
        .bind(order.assembled_at)
        .bind(order.completed_at)
        .bind(order.deleted_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, item_id, item_name, quantity, unit_price, line_total)
                VALUES ($1,$2,$3,$4,$5,$6,$7)
                "#,
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.item_id)
            .bind(&item.item_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn update(&self, order: Order) -> Result<Order> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = $2, updated_at = $3, paid_at = $4, assembled_at = $5,
                completed_at = $6, deleted_at = $7
            WHERE id = $1
            "#,
        )
        .bind(order.id)
        .bind(status_str(order.status))
        .bind(order.updated_at)
        .bind(order.paid_at)
        .bind(order.assembled_at)
        .bind(order.completed_at)
        .bind(order.deleted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("order {} not found", order.id)));
        }
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, total_amount, currency, created_at, updated_at, \
             paid_at, assembled_at, completed_at, deleted_at \
             FROM orders WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        let items = self.load_items(id).await?;
        assemble(row, items)
    }

    async fn list_by_user(&self, user_id: Uuid, pagination: Pagination) -> Result<Page<Order>> {
        self.list(Some(user_id), None, pagination).await
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        status: Option<OrderStatus>,
        pagination: Pagination,
    ) -> Result<Page<Order>> {
        let (limit, offset) = pagination.normalized();
        let status_str = status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, status, total_amount, currency, created_at, updated_at,
                   paid_at, assembled_at, completed_at, deleted_at
            FROM orders
            WHERE deleted_at IS NULL
              AND ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE deleted_at IS NULL
              AND ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(status_str)
        .fetch_one(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let order_items = self.load_items(row.id).await?;
            items.push(assemble(row, order_items)?);
        }

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }

    async fn metrics(&self) -> Result<OrderMetrics> {
        #[derive(FromRow)]
        struct Row {
            total_orders: i64,
            completed_orders: i64,
            failed_orders: i64,
            average_order_value: Option<Decimal>,
            orders_today: i64,
            revenue_today: Option<Decimal>,
        }

        let row = sqlx::query_as::<_, Row>(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed_orders,
                COUNT(*) FILTER (WHERE status = 'failed') AS failed_orders,
                AVG(total_amount) AS average_order_value,
                COUNT(*) FILTER (WHERE created_at::date = CURRENT_DATE) AS orders_today,
                SUM(total_amount) FILTER (WHERE created_at::date = CURRENT_DATE) AS revenue_today
            FROM orders
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderMetrics {
            total_orders: row.total_orders,
            completed_orders: row.completed_orders,
            failed_orders: row.failed_orders,
            average_order_value: row.average_order_value.unwrap_or(Decimal::ZERO),
            orders_today: row.orders_today,
            revenue_today: row.revenue_today.unwrap_or(Decimal::ZERO),
        })
    }
}
