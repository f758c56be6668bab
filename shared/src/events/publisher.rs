// ============================================================================
// ROCKET PARTS PLATFORM - EVENT PUBLISHER
// ============================================================================
// Module: shared/src/events/publisher.rs
// Description: At-least-once publisher over the in-process bus (see
//              shared::events::EventBus). Retries transient send failures
//              via shared::retry::RetryPolicy before surfacing to the
//              caller, per spec.md §4.7 / §7 ("event-publish failures
//              after payment success are logged only").
// ============================================================================

use serde::Serialize;
use tracing::{info, warn};

use super::bus::EventBus;
use super::types::BusEnvelope;
use crate::error::Error;
use crate::retry::RetryPolicy;

#[derive(Clone)]
pub struct EventPublisher {
    bus: EventBus,
    retry: RetryPolicy,
}

impl EventPublisher {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            retry: RetryPolicy::event_publish(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Publish `payload` on `topic`, retrying transient failures. Callers
    /// on the saga's success path treat a final failure as log-and-continue
    /// (spec.md §4.5 step 7) rather than rolling back the already-successful
    /// payment.
    pub async fn publish(&self, topic: &'static str, payload: impl Serialize) -> Result<(), Error> {
        let envelope = BusEnvelope::new(topic, payload)
            .map_err(|e| Error::Internal(format!("event serialization failed: {e}")))?;

        self.retry
            .run("event_publish", || {
                let bus = self.bus.clone();
                let envelope = envelope.clone();
                async move { bus.send(envelope) }
            })
            .await
            .map(|_| info!(topic, event_id = %envelope.id, "published event"))
    }
}

impl EventBus {
    fn send(&self, envelope: BusEnvelope) -> Result<(), Error> {
        match self.sender(envelope.topic).send(envelope) {
            Ok(_subscriber_count) => Ok(()),
            Err(_) => {
                warn!(topic = "event_publish", "no subscribers currently listening");
                Err(Error::ExternalDependency {
                    service: "event_bus".to_string(),
                    source: "no active subscribers".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::bus::EventBus;
    use super::*;
    use crate::events::types::{AssemblyCompletedEvent, TOPIC_ASSEMBLY_EVENTS};
    use uuid::Uuid;

    #[tokio::test]
    async fn publish_fails_without_subscribers_after_retries() {
        let bus = EventBus::new();
        let publisher = EventPublisher::new(bus).with_retry(RetryPolicy::new(
            2,
            std::time::Duration::from_millis(1),
        ));

        let err = publisher
            .publish(
                TOPIC_ASSEMBLY_EVENTS,
                AssemblyCompletedEvent {
                    order_id: Uuid::new_v4(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn publish_succeeds_with_an_active_subscriber() {
        let bus = EventBus::new();
        let _rx = bus.sender(TOPIC_ASSEMBLY_EVENTS).subscribe();
        let publisher = EventPublisher::new(bus);

        publisher
            .publish(
                TOPIC_ASSEMBLY_EVENTS,
                AssemblyCompletedEvent {
                    order_id: Uuid::new_v4(),
                },
            )
            .await
            .unwrap();
    }
}
