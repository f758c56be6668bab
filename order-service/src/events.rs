// ============================================================================
// ROCKET PARTS PLATFORM - ASSEMBLY EVENT CONSUMER
// ============================================================================
// Module: order-service/src/events.rs
// Description: Subscribes to `assembly-events` and drives an order from
//              paid to assembled to completed (spec.md §4.5, final
//              paragraph). The handler is idempotent keyed on order_id
//              (spec.md §4.7): redelivery of an already-applied event is a
//              no-op, not a fatal error.
// ============================================================================

use async_trait::async_trait;
use rocketparts_shared::error::Result;
use rocketparts_shared::events::{AssemblyCompletedEvent, EventHandler};
use std::sync::Arc;
use tracing::{info, warn};

use crate::repository::OrderRepository;

pub struct AssemblyCompletedHandler<R: OrderRepository> {
    repository: Arc<R>,
}

impl<R: OrderRepository> AssemblyCompletedHandler<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: OrderRepository + 'static> EventHandler<AssemblyCompletedEvent>
    for AssemblyCompletedHandler<R>
{
    async fn handle(&self, payload: AssemblyCompletedEvent) -> Result<()> {
        let mut order = match self.repository.find_by_id(payload.order_id).await {
            Ok(order) => order,
            Err(err) => {
                warn!(order_id = %payload.order_id, %err, "assembly event for unknown order");
                return Ok(());
            }
        };

        order.mark_assembled_then_completed();
        self.repository.update(order).await?;
        info!(order_id = %payload.order_id, "order assembled and completed");
        Ok(())
    }
}
