// ============================================================================
// ROCKET PARTS PLATFORM - SHARED CRATE
// ============================================================================
// Module: shared/src/lib.rs
// Description: Cross-service primitives for the order-fulfillment saga:
//              error taxonomy, retry policy, event bus, config loader, and
//              pagination types. No service-specific domain logic lives
//              here (see order-service/inventory-service/payment-service
//              for that).
// ============================================================================

pub mod config;
pub mod error;
pub mod events;
pub mod retry;
pub mod types;

pub use config::CommonConfig;
pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use types::{Page, Pagination};
