// ============================================================================
// ROCKET PARTS PLATFORM - EVENT SUBSCRIBER
// ============================================================================
// Module: shared/src/events/subscriber.rs
// Description: Consumer-group-shaped subscription over the in-process bus.
//              A single logical partition is processed serially per key
//              (spec.md §4.7/§9: "implementations choosing parallel
//              partition consumption must still serialize per key"), and
//              handler errors cause the message to be retried in place,
//              standing in for broker redelivery since the simulated bus
//              has no separate dead-letter/offset mechanism.
// ============================================================================

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, warn};
use uuid::Uuid;

use super::bus::EventBus;
use crate::error::Error;
use crate::retry::RetryPolicy;

#[async_trait]
pub trait EventHandler<T>: Send + Sync {
    /// Handle one delivery. Must be idempotent keyed on whatever `key_of`
    /// extracts from `T` (spec.md §4.7: "idempotent keyed on order_id").
    async fn handle(&self, payload: T) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct EventSubscriber {
    bus: EventBus,
    retry: RetryPolicy,
}

impl EventSubscriber {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            retry: RetryPolicy::new(3, std::time::Duration::from_millis(200)),
        }
    }

    /// Spawn a background consumer for `topic`. `key_of` extracts the
    /// per-message serialization key (order_id); deliveries sharing a key
    /// never run concurrently, deliveries with different keys do.
    pub fn spawn<T, H, K>(
        &self,
        topic: &'static str,
        handler: Arc<H>,
        key_of: K,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
        H: EventHandler<T> + 'static,
        K: Fn(&T) -> Uuid + Send + Sync + 'static,
    {
        let mut rx = self.bus.subscribe(topic);
        let retry = self.retry;

        tokio::spawn(async move {
            let locks: DashMap<Uuid, Arc<Mutex<()>>> = DashMap::new();
            loop {
                match rx.recv().await {
                    Ok(envelope) => {
                        let payload: T = match envelope.decode() {
                            Ok(p) => p,
                            Err(e) => {
                                warn!(topic, %e, "dropping malformed event payload");
                                continue;
                            }
                        };
                        let key = key_of(&payload);
                        let lock = locks
                            .entry(key)
                            .or_insert_with(|| Arc::new(Mutex::new(())))
                            .clone();
                        let _guard = lock.lock().await;

                        let result = retry
                            .run("event_consume", || {
                                let handler = handler.clone();
                                let payload = payload.clone();
                                async move { handler.handle(payload).await }
                            })
                            .await;

                        if let Err(err) = result {
                            error!(topic, %key, %err, "handler failed after redelivery attempts");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(topic, skipped, "consumer lagged, some messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::publisher::EventPublisher;
    use crate::events::types::{AssemblyCompletedEvent, TOPIC_ASSEMBLY_EVENTS};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventHandler<AssemblyCompletedEvent> for CountingHandler {
        async fn handle(&self, _payload: AssemblyCompletedEvent) -> Result<(), Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn delivers_published_event_to_subscriber() {
        let bus = EventBus::new();
        let subscriber = EventSubscriber::new(bus.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(CountingHandler {
            calls: calls.clone(),
        });

        let _task = subscriber.spawn(TOPIC_ASSEMBLY_EVENTS, handler, |e| e.order_id);

        // give the consumer task a moment to subscribe before publishing.
        tokio::time::sleep(Duration::from_millis(10)).await;

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

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
