// ============================================================================
// ROCKET PARTS PLATFORM - ORDER ORCHESTRATOR (THE SAGA)
// ============================================================================
// Module: order-service/src/orchestrator.rs
// Description: Drives the cross-service order-fulfillment saga (spec.md
//              §4.5): availability check, reservation, persistence, bounded
//              payment retry, and compensation on failure. Grounded on the
//              teacher's `commerce::services::order::OrderService::create_order`
//              step sequencing, generalized across the reservation/payment
//              RPC boundary this deployment adds.
// ============================================================================

use rocketparts_shared::error::{Error, Result};
use rocketparts_shared::events::{EventPublisher, PaymentProcessedEvent, TOPIC_PAYMENT_EVENTS};
use rocketparts_shared::retry::RetryPolicy;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clients::{InventoryClient, PaymentClient, RequestedItem};
use crate::domain::{NewOrderItem, Order};
use crate::repository::OrderRepository;

#[derive(Debug, Clone)]
pub struct RequestedLine {
    pub item_id: Uuid,
    pub sku: String,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub items: Vec<RequestedLine>,
    pub currency: String,
    pub payment_method: String,
}

pub struct OrderOrchestrator<R: OrderRepository> {
    repository: Arc<R>,
    inventory: InventoryClient,
    payment: PaymentClient,
    publisher: EventPublisher,
    payment_retry: RetryPolicy,
    reservation_ttl_minutes: i64,
}

impl<R: OrderRepository> OrderOrchestrator<R> {
    pub fn new(
        repository: Arc<R>,
        inventory: InventoryClient,
        payment: PaymentClient,
        publisher: EventPublisher,
        reservation_ttl_minutes: i64,
    ) -> Self {
        Self {
            repository,
            inventory,
            payment,
            publisher,
            payment_retry: RetryPolicy::saga_payment(),
            reservation_ttl_minutes,
        }
    }

    /// Runs steps 1-9 of spec.md §4.5 for a single order.
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order> {
        // Step 1: validate.
        if request.items.is_empty() {
            return Err(Error::Validation("order must have at least one item".into()));
        }
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(Error::Validation(format!(
                    "quantity for {} must be positive",
                    item.sku
                )));
            }
        }

        // Step 2: check availability.
        let requested: Vec<RequestedItem> = request
            .items
            .iter()
            .map(|i| RequestedItem {
                sku: i.sku.clone(),
                quantity: i.quantity,
            })
            .collect();
        let report = self.inventory.check_availability(&requested).await?;

        let mut new_items = Vec::with_capacity(request.items.len());
        for requested_line in &request.items {
            let availability = report
                .items
                .iter()
                .find(|i| i.sku == requested_line.sku)
                .filter(|i| i.available)
                .ok_or_else(|| {
                    Error::Validation(format!(
                        "{} is not available in the requested quantity",
                        requested_line.sku
                    ))
                })?;
            let unit_price = availability.unit_price.unwrap_or(Decimal::ZERO);
            new_items.push(NewOrderItem {
                item_id: requested_line.item_id,
                item_name: availability
                    .name
                    .clone()
                    .unwrap_or_else(|| requested_line.sku.clone()),
                quantity: requested_line.quantity,
                unit_price,
            });
        }

        // Step 3: build order (new uuid, pending, computed total).
        let order = Order::new(request.user_id, new_items, &request.currency)?;

        // Step 4: reserve.
        self.inventory
            .reserve_items(order.id, &requested, self.reservation_ttl_minutes)
            .await?;

        // Step 5: persist pending order + line items atomically.
        let order_id = order.id;
        let order = match self.repository.create(order).await {
            Ok(order) => order,
            Err(err) => {
                // Step 9: step 5 failed after step 4 succeeded — compensate.
                self.compensate_release(order_id, "persist_failed").await;
                return Err(err);
            }
        };

        // Step 6: pay, with bounded retry (transient errors only).
        let payment_result = self
            .payment_retry
            .run("saga.process_payment", || {
                let order = &order;
                let request = &request;
                async move {
                    self.payment
                        .process_payment(
                            order.id,
                            order.user_id,
                            order.total_amount,
                            &order.currency,
                            &request.payment_method,
                            &format!("order {}", order.id),
                        )
                        .await
                }
            })
            .await;

        match payment_result {
            Ok(result) if result.status == "completed" => {
                // Step 7: payment success. Confirm the reservation first —
                // this is what actually converts the hold into a sale
                // (debits reserved_stock/total_stock); a paid order must
                // never leave inventory un-consumed (spec.md §1 invariant
                // b). Confirm failures are logged, not fatal: payment has
                // already succeeded and cannot be unwound here.
                if let Err(err) = self.inventory.confirm_reservation(order.id).await {
                    warn!(order_id = %order.id, %err, "reservation confirm failed after payment succeeded");
                }

                let mut order = order;
                order.mark_paid()?;
                let order = self.repository.update(order).await?;

                if let Err(err) = self
                    .publisher
                    .publish(
                        TOPIC_PAYMENT_EVENTS,
                        PaymentProcessedEvent {
                            order_id: order.id,
                            user_id: order.user_id,
                            amount: order.total_amount,
                            currency: order.currency.clone(),
                            transaction_id: result.transaction_id,
                            processed_at: chrono::Utc::now(),
                        },
                    )
                    .await
                {
                    warn!(order_id = %order.id, %err, "payment event publish failed, payment stands");
                }

                info!(order_id = %order.id, "order paid");
                Ok(order)
            }
            Ok(result) => {
                // Step 8: payment engine returned a terminal failure.
                self.fail_order(order, result.failure_reason.as_deref()).await
            }
            Err(err) => {
                // Step 8: retries exhausted or non-retryable failure.
                error!(order_id = %order.id, %err, "payment failed");
                self.fail_order(order, Some(err.to_string().as_str())).await
            }
        }
    }

    async fn fail_order(&self, mut order: Order, reason: Option<&str>) -> Result<Order> {
        order.mark_failed()?;
        let order = self.repository.update(order).await?;
        self.compensate_release(order.id, reason.unwrap_or("payment_failed"))
            .await;
        Ok(order)
    }

    /// Best-effort compensating action (spec.md §4.5 step 8/9): failures
    /// here are logged, never re-raised, so they cannot mask the original
    /// saga error.
    async fn compensate_release(&self, order_id: Uuid, reason: &str) {
        if let Err(err) = self.inventory.release_reservation(order_id, reason).await {
            warn!(order_id = %order_id, %err, "compensating release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_item_list() {
        let request = CreateOrderRequest {
            user_id: Uuid::new_v4(),
            items: vec![],
            currency: "USD".into(),
            payment_method: "card".into(),
        };
        assert!(request.items.is_empty());
    }
}
