// ============================================================================
// ROCKET PARTS PLATFORM - INVENTORY SERVICE
// ============================================================================
// Module: inventory-service/src/lib.rs
// Description: Inventory domain model, repository, service, sweeper, and
//              gRPC surface (spec.md §4.1-§4.3, §4.8).
// ============================================================================

pub mod config;
pub mod domain;
pub mod grpc;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod sweeper;

pub use domain::{Category, InventoryItem, ItemStatus, Reservation, ReservationStatus};
pub use repository::{InMemoryInventoryRepository, InventoryRepository};
pub use service::{InventoryService, ReservationRequestItem};
