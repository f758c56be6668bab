// ============================================================================
// ROCKET PARTS PLATFORM - EVENT PAYLOADS
// ============================================================================
// Module: shared/src/events/types.rs
// Description: Wire payloads for the two topics the saga touches, per
//              spec.md §6. Kept separate from shared::error/shared::types
//              so services can depend on just the payload shapes they need.
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Published to `payment-events` after a successful `ProcessPayment` call,
/// per spec.md §4.5 step 7.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentProcessedEvent {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: String,
    pub processed_at: DateTime<Utc>,
}

/// Consumed from `assembly-events`; only `order_id` is meaningful per
/// spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssemblyCompletedEvent {
    pub order_id: Uuid,
}

/// Envelope wrapping a topic payload as it crosses the bus. Mirrors the
/// teacher's `DomainEvent` shape (id/occurred_at/event_type) without the
/// multi-tenant fields this deployment has no use for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEnvelope {
    pub id: Uuid,
    pub topic: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl BusEnvelope {
    pub fn new(topic: &'static str, payload: impl Serialize) -> serde_json::Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            topic,
            occurred_at: Utc::now(),
            payload: serde_json::to_value(payload)?,
        })
    }

    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.payload.clone())
    }
}

pub const TOPIC_PAYMENT_EVENTS: &str = "payment-events";
pub const TOPIC_ASSEMBLY_EVENTS: &str = "assembly-events";
