// ============================================================================
// ROCKET PARTS PLATFORM - IN-PROCESS EVENT BUS
// ============================================================================
// Module: shared/src/events/bus.rs
// Description: Simulated broker transport behind the same publish/subscribe
//              contract a Kafka/Redis Streams binding would expose (teacher's
//              shared::events::publisher/subscriber split, with Redis swapped
//              for an in-process tokio broadcast channel per DESIGN.md). A
//              real broker adapter is a drop-in behind EventPublisher's and
//              EventSubscriber's public API.
// ============================================================================

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::BusEnvelope;

const CHANNEL_CAPACITY: usize = 1024;

/// Cheaply cloneable handle to a set of named topics. Each topic is backed
/// by its own broadcast channel so `assembly-events` consumers never see
/// `payment-events` traffic and vice versa.
#[derive(Clone)]
pub struct EventBus {
    topics: Arc<DashMap<&'static str, broadcast::Sender<BusEnvelope>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
        }
    }

    pub(super) fn sender(&self, topic: &'static str) -> broadcast::Sender<BusEnvelope> {
        self.topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    pub fn subscribe(&self, topic: &'static str) -> broadcast::Receiver<BusEnvelope> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
