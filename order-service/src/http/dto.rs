// ============================================================================
// ROCKET PARTS PLATFORM - ORDER HTTP DTOs
// ============================================================================
// Module: order-service/src/http/dto.rs
// Description: Request/response wire shapes for the Order HTTP API
//              (spec.md §6). Grounded on the teacher's
//              `commerce::handlers::orders` request/response pairing, with
//              the advanced-search/bulk-update surface this deployment has
//              no use for dropped (see DESIGN.md).
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Order, OrderItem, OrderStatus};
use crate::orchestrator::{CreateOrderRequest, RequestedLine};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderLineRequest {
    /// Identifies the catalog item. Resolved against the inventory
    /// service's sku index; see DESIGN.md for the item_id/sku mapping
    /// decision.
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderHttpRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1))]
    #[validate]
    pub items: Vec<CreateOrderLineRequest>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_payment_method() -> String {
    "card".to_string()
}

impl From<CreateOrderHttpRequest> for CreateOrderRequest {
    fn from(req: CreateOrderHttpRequest) -> Self {
        CreateOrderRequest {
            user_id: req.user_id,
            items: req
                .items
                .into_iter()
                .map(|i| RequestedLine {
                    item_id: Uuid::new_v4(),
                    sku: i.item_id,
                    quantity: i.quantity,
                })
                .collect(),
            currency: req.currency,
            payment_method: req.payment_method,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            item_id: item.item_id,
            item_name: item.item_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub assembled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            items: order.items.iter().map(OrderItemResponse::from).collect(),
            total_amount: order.total_amount,
            currency: order.currency,
            created_at: order.created_at,
            updated_at: order.updated_at,
            paid_at: order.paid_at,
            assembled_at: order.assembled_at,
            completed_at: order.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct OrderMetricsResponse {
    pub total_orders: i64,
    pub completed_orders: i64,
    pub failed_orders: i64,
    pub average_order_value: Decimal,
    pub orders_today: i64,
    pub revenue_today: Decimal,
}
