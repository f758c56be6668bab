// ============================================================================
// ROCKET PARTS PLATFORM - HEALTH SURFACE
// ============================================================================
// Module: order-service/src/http/health.rs
// Description: `/health`, `/ready`, `/live` (spec.md §6). Composite health
//              reports the repository dependency; readiness gates only on
//              that critical dependency; liveness never checks dependencies.
//              JSON chosen over Prometheus exposition for `/metrics` (the
//              spec.md §9 open choice resolved in DESIGN.md); the order
//              metrics themselves live in http::handlers::get_order_metrics.
// ============================================================================

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::http::AppState;
use crate::repository::OrderRepository;

#[derive(Serialize)]
struct ComponentHealth {
    status: &'static str,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
    dependencies: Dependencies,
}

#[derive(Serialize)]
struct Dependencies {
    repository: ComponentHealth,
}

pub async fn health<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    let repository_ok = state.repository.metrics().await.is_ok();
    let status = if repository_ok { "healthy" } else { "degraded" };
    let code = if repository_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthBody {
            status,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            dependencies: Dependencies {
                repository: ComponentHealth {
                    status: if repository_ok { "operational" } else { "degraded" },
                },
            },
        }),
    )
}

pub async fn ready<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    match state.repository.metrics().await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "ready": true }))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "ready": false })),
        ),
    }
}

pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "alive": true })))
}
