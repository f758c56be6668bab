// ============================================================================
// ROCKET PARTS PLATFORM - ORDER SERVICE
// ============================================================================
// Module: order-service/src/lib.rs
// Description: Order domain model, repository, RPC clients, saga
//              orchestrator, event consumer, and HTTP surface (spec.md
//              §4.5-§4.7, §6).
// ============================================================================

pub mod clients;
pub mod config;
pub mod domain;
pub mod events;
pub mod http;
pub mod orchestrator;
pub mod postgres;
pub mod repository;

pub use domain::{Order, OrderItem, OrderStatus};
pub use orchestrator::OrderOrchestrator;
pub use repository::{InMemoryOrderRepository, OrderMetrics, OrderRepository};
