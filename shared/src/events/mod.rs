// ============================================================================
// ROCKET PARTS PLATFORM - EVENT SYSTEM
// ============================================================================
// Module: shared/src/events/mod.rs
// Description: At-least-once event bus shared by order-service (publisher
//              of payment-events, consumer of assembly-events). See
//              bus.rs/publisher.rs/subscriber.rs/types.rs for the split.
// ============================================================================

pub mod bus;
pub mod publisher;
pub mod subscriber;
pub mod types;

pub use bus::EventBus;
pub use publisher::EventPublisher;
pub use subscriber::{EventHandler, EventSubscriber};
pub use types::{
    AssemblyCompletedEvent, BusEnvelope, PaymentProcessedEvent, TOPIC_ASSEMBLY_EVENTS,
    TOPIC_PAYMENT_EVENTS,
};
