// ============================================================================
// ROCKET PARTS PLATFORM - ORDER HTTP SURFACE
// ============================================================================
// Module: order-service/src/http/mod.rs
// Description: axum router for the Order HTTP API (spec.md §6), grounded
//              on the teacher's `commerce::handlers::orders::create_order_router`
//              shape. Path params use axum 0.7's `{param}` syntax.
// ============================================================================

pub mod dto;
pub mod handlers;
pub mod health;

use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::orchestrator::OrderOrchestrator;
use crate::repository::OrderRepository;

pub struct AppState<R: OrderRepository> {
    pub orchestrator: Arc<OrderOrchestrator<R>>,
    pub repository: Arc<R>,
}

pub fn router<R: OrderRepository + 'static>(state: Arc<AppState<R>>) -> Router {
    Router::new()
        .route("/health", get(health::health::<R>))
        .route("/ready", get(health::ready::<R>))
        .route("/live", get(health::live))
        .route(
            "/api/v1/orders",
            post(handlers::create_order::<R>).get(handlers::list_orders::<R>),
        )
        .route("/api/v1/orders/metrics", get(handlers::get_order_metrics::<R>))
        .route("/api/v1/orders/{id}", get(handlers::get_order::<R>))
        .route(
            "/api/v1/orders/{id}/status",
            patch(handlers::update_order_status::<R>),
        )
        .route(
            "/api/v1/users/{uid}/orders",
            get(handlers::list_orders_for_user::<R>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
