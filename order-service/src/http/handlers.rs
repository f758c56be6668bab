// ============================================================================
// ROCKET PARTS PLATFORM - ORDER HTTP HANDLERS
// ============================================================================
// Module: order-service/src/http/handlers.rs
// Description: Handlers for the Order HTTP API (spec.md §6), grounded on
//              the teacher's `commerce::handlers::orders` handler shape
//              (State extractor over an Arc'd service, Json in/out).
// ============================================================================

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rocketparts_shared::error::{Error, Result};
use rocketparts_shared::types::Pagination;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::OrderStatus;
use crate::http::dto::{
    CreateOrderHttpRequest, ListOrdersQuery, OrderListResponse, OrderMetricsResponse,
    OrderResponse, UpdateOrderStatusRequest,
};
use crate::http::AppState;
use crate::repository::OrderRepository;

fn parse_status(raw: &str) -> Result<OrderStatus> {
    Ok(match raw {
        "pending" => OrderStatus::Pending,
        "paid" => OrderStatus::Paid,
        "assembled" => OrderStatus::Assembled,
        "completed" => OrderStatus::Completed,
        "cancelled" => OrderStatus::Cancelled,
        "failed" => OrderStatus::Failed,
        other => return Err(Error::Validation(format!("unknown order status {other}"))),
    })
}

pub async fn create_order<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(request): Json<CreateOrderHttpRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    request
        .validate()
        .map_err(|e| Error::Validation(e.to_string()))?;

    let order = state.orchestrator.create_order(request.into()).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn get_order<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>> {
    let order = state.repository.find_by_id(order_id).await?;
    Ok(Json(order.into()))
}

pub async fn list_orders_for_user<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrderListResponse>> {
    let page = state
        .repository
        .list_by_user(
            user_id,
            Pagination {
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;

    Ok(Json(OrderListResponse {
        items: page.items.into_iter().map(OrderResponse::from).collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    }))
}

pub async fn list_orders<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrderListResponse>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let page = state
        .repository
        .list(
            query.user_id,
            status,
            Pagination {
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;

    Ok(Json(OrderListResponse {
        items: page.items.into_iter().map(OrderResponse::from).collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    }))
}

pub async fn update_order_status<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let mut order = state.repository.find_by_id(order_id).await?;
    match request.status {
        OrderStatus::Cancelled => order.mark_cancelled()?,
        OrderStatus::Failed => order.mark_failed()?,
        OrderStatus::Paid => order.mark_paid()?,
        other => {
            return Err(Error::Validation(format!(
                "status {other:?} cannot be set directly"
            )))
        }
    }
    let order = state.repository.update(order).await?;
    Ok(Json(order.into()))
}

pub async fn get_order_metrics<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<OrderMetricsResponse>> {
    let metrics = state.repository.metrics().await?;
    Ok(Json(OrderMetricsResponse {
        total_orders: metrics.total_orders,
        completed_orders: metrics.completed_orders,
        failed_orders: metrics.failed_orders,
        average_order_value: metrics.average_order_value,
        orders_today: metrics.orders_today,
        revenue_today: metrics.revenue_today,
    }))
}
