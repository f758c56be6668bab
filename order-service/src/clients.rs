// ============================================================================
// ROCKET PARTS PLATFORM - RPC CLIENTS WITH RETRY
// ============================================================================
// Module: order-service/src/clients.rs
// Description: gRPC clients to the inventory and payment services, wrapped
//              in shared::retry::RetryPolicy with per-call deadlines
//              (spec.md §4.6). Downstream tonic::Status values are
//              classified into the shared error taxonomy at this boundary
//              (spec.md §9: "closed sum type plus a classifier", never by
//              string matching).
// ============================================================================

use chrono::{DateTime, Utc};
use rocketparts_shared::error::{Error, Result};
use rocketparts_shared::retry::RetryPolicy;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::Request;
use uuid::Uuid;

pub mod inventory_proto {
    tonic::include_proto!("rocketparts.inventory.v1");
}

pub mod payment_proto {
    tonic::include_proto!("rocketparts.payment.v1");
}

use inventory_proto::inventory_service_client::InventoryServiceClient;
use payment_proto::payment_service_client::PaymentServiceClient;

#[derive(Debug, Clone)]
pub struct RequestedItem {
    pub sku: String,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct ItemAvailability {
    pub sku: String,
    pub available: bool,
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct AvailabilityReport {
    pub items: Vec<ItemAvailability>,
    pub all_available: bool,
}

#[derive(Debug, Clone)]
pub struct ReservationOutcome {
    pub reservation_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Client for the inventory gRPC surface (spec.md §6), retrying transient
/// failures with `RetryPolicy` and wrapping each attempt in a deadline.
#[derive(Clone)]
pub struct InventoryClient {
    client: InventoryServiceClient<Channel>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl InventoryClient {
    pub fn new(channel: Channel, retry: RetryPolicy, call_timeout: Duration) -> Self {
        Self {
            client: InventoryServiceClient::new(channel),
            retry,
            call_timeout,
        }
    }

    pub async fn check_availability(&self, items: &[RequestedItem]) -> Result<AvailabilityReport> {
        let items = items.to_vec();
        self.retry
            .run("inventory.check_availability", || {
                let mut client = self.client.clone();
                let items = items.clone();
                let timeout = self.call_timeout;
                async move {
                    let mut request = Request::new(inventory_proto::CheckAvailabilityRequest {
                        items: items
                            .iter()
                            .map(|i| inventory_proto::RequestedItem {
                                sku: i.sku.clone(),
                                quantity: i.quantity,
                            })
                            .collect(),
                    });
                    request.set_timeout(timeout);
                    let response = client
                        .check_availability(request)
                        .await
                        .map_err(|status| Error::from_status("inventory", &status))?
                        .into_inner();

                    Ok(AvailabilityReport {
                        items: response
                            .items
                            .into_iter()
                            .map(|i| ItemAvailability {
                                sku: i.sku,
                                available: i.available,
                                name: (!i.name.is_empty()).then_some(i.name),
                                unit_price: Decimal::from_str(&i.unit_price).ok(),
                            })
                            .collect(),
                        all_available: response.all_available,
                    })
                }
            })
            .await
    }

    pub async fn reserve_items(
        &self,
        order_id: Uuid,
        items: &[RequestedItem],
        ttl_minutes: i64,
    ) -> Result<ReservationOutcome> {
        let items = items.to_vec();
        self.retry
            .run("inventory.reserve_items", || {
                let mut client = self.client.clone();
                let items = items.clone();
                let timeout = self.call_timeout;
                async move {
                    let mut request = Request::new(inventory_proto::ReserveItemsRequest {
                        order_id: order_id.to_string(),
                        items: items
                            .iter()
                            .map(|i| inventory_proto::RequestedItem {
                                sku: i.sku.clone(),
                                quantity: i.quantity,
                            })
                            .collect(),
                        ttl_minutes,
                    });
                    request.set_timeout(timeout);
                    let response = client
                        .reserve_items(request)
                        .await
                        .map_err(|status| Error::from_status("inventory", &status))?
                        .into_inner();

                    let expires_at = DateTime::parse_from_rfc3339(&response.expires_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now());

                    Ok(ReservationOutcome {
                        reservation_id: response.reservation_id,
                        expires_at,
                    })
                }
            })
            .await
    }

    pub async fn confirm_reservation(&self, order_id: Uuid) -> Result<()> {
        self.retry
            .run("inventory.confirm_reservation", || {
                let mut client = self.client.clone();
                let timeout = self.call_timeout;
                async move {
                    let mut request = Request::new(inventory_proto::ConfirmReservationRequest {
                        order_id: order_id.to_string(),
                        reservation_id: String::new(),
                    });
                    request.set_timeout(timeout);
                    client
                        .confirm_reservation(request)
                        .await
                        .map_err(|status| Error::from_status("inventory", &status))?;
                    Ok(())
                }
            })
            .await
    }

    pub async fn release_reservation(&self, order_id: Uuid, reason: &str) -> Result<()> {
        let reason = reason.to_string();
        self.retry
            .run("inventory.release_reservation", || {
                let mut client = self.client.clone();
                let reason = reason.clone();
                let timeout = self.call_timeout;
                async move {
                    let mut request = Request::new(inventory_proto::ReleaseReservationRequest {
                        order_id: order_id.to_string(),
                        reservation_id: String::new(),
                        reason,
                    });
                    request.set_timeout(timeout);
                    client
                        .release_reservation(request)
                        .await
                        .map_err(|status| Error::from_status("inventory", &status))?;
                    Ok(())
                }
            })
            .await
    }
}

#[derive(Debug, Clone)]
pub struct PaymentResult {
    pub transaction_id: String,
    pub status: String,
    pub failure_reason: Option<String>,
}

/// Client for the payment gRPC surface, driving the saga's bounded-retry
/// payment leg (spec.md §4.5 step 6: "up to 3 attempts with linear
/// back-off (1s, 2s)").
#[derive(Clone)]
pub struct PaymentClient {
    client: PaymentServiceClient<Channel>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl PaymentClient {
    pub fn new(channel: Channel, retry: RetryPolicy, call_timeout: Duration) -> Self {
        Self {
            client: PaymentServiceClient::new(channel),
            retry,
            call_timeout,
        }
    }

    pub async fn process_payment(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
        currency: &str,
        method: &str,
        description: &str,
    ) -> Result<PaymentResult> {
        let currency = currency.to_string();
        let method = method.to_string();
        let description = description.to_string();

        self.retry
            .run("payment.process_payment", || {
                let mut client = self.client.clone();
                let currency = currency.clone();
                let method = method.clone();
                let description = description.clone();
                let timeout = self.call_timeout;
                async move {
                    let mut request = Request::new(payment_proto::ProcessPaymentRequest {
                        order_id: order_id.to_string(),
                        user_id: user_id.to_string(),
                        amount: amount.to_string(),
                        currency,
                        method,
                        description,
                    });
                    request.set_timeout(timeout);
                    let response = client
                        .process_payment(request)
                        .await
                        .map_err(|status| Error::from_status("payment", &status))?
                        .into_inner();

                    Ok(PaymentResult {
                        transaction_id: response.transaction_id,
                        status: payment_status_name(response.status),
                        failure_reason: (!response.failure_reason.is_empty())
                            .then_some(response.failure_reason),
                    })
                }
            })
            .await
    }
}

fn payment_status_name(raw: i32) -> String {
    match payment_proto::PaymentStatus::try_from(raw) {
        Ok(payment_proto::PaymentStatus::PaymentStatusCompleted) => "completed".to_string(),
        Ok(payment_proto::PaymentStatus::PaymentStatusFailed) => "failed".to_string(),
        Ok(payment_proto::PaymentStatus::PaymentStatusRefunded) => "refunded".to_string(),
        Ok(payment_proto::PaymentStatus::PaymentStatusPartiallyRefunded) => {
            "partially_refunded".to_string()
        }
        _ => "pending".to_string(),
    }
}
