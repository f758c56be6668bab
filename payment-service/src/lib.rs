// ============================================================================
// ROCKET PARTS PLATFORM - PAYMENT SERVICE
// ============================================================================
// Module: payment-service/src/lib.rs
// Description: Simulated payment engine, in-memory ledger, and gRPC
//              surface (spec.md §4.4).
// ============================================================================

pub mod config;
pub mod domain;
pub mod engine;
pub mod grpc;
pub mod repository;

pub use domain::{FailureReason, PaymentRecord, PaymentStatus};
pub use engine::{PaymentEngine, PaymentEngineConfig, ProcessPaymentRequest};
pub use repository::{InMemoryPaymentRepository, PaymentRepository};
