// ============================================================================
// ROCKET PARTS PLATFORM - PAYMENT GRPC SERVER
// ============================================================================
// Module: payment-service/src/grpc.rs
// Description: tonic server implementation wiring proto/payment.proto
//              (spec.md §6) onto PaymentEngine (spec.md §4.4).
// ============================================================================

use std::str::FromStr;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use rust_decimal::Decimal;

use crate::domain::{FailureReason, PaymentRecord, PaymentStatus};
use crate::engine::{PaymentEngine, ProcessPaymentRequest as EngineRequest};
use crate::repository::PaymentRepository;

pub mod proto {
    tonic::include_proto!("rocketparts.payment.v1");
}

use proto::payment_service_server::{PaymentService as GrpcService, PaymentServiceServer};
use proto::*;

pub struct PaymentGrpc<R: PaymentRepository> {
    engine: Arc<PaymentEngine<R>>,
}

impl<R: PaymentRepository + 'static> PaymentGrpc<R> {
    pub fn new(engine: Arc<PaymentEngine<R>>) -> Self {
        Self { engine }
    }

    pub fn into_server(self) -> PaymentServiceServer<Self> {
        PaymentServiceServer::new(self)
    }
}

fn status_to_wire(s: PaymentStatus) -> proto::PaymentStatus {
    match s {
        PaymentStatus::Pending => proto::PaymentStatus::PaymentStatusPending,
        PaymentStatus::Completed => proto::PaymentStatus::PaymentStatusCompleted,
        PaymentStatus::Failed => proto::PaymentStatus::PaymentStatusFailed,
        PaymentStatus::Refunded => proto::PaymentStatus::PaymentStatusRefunded,
        PaymentStatus::PartiallyRefunded => proto::PaymentStatus::PaymentStatusPartiallyRefunded,
    }
}

fn failure_reason_str(r: Option<FailureReason>) -> String {
    r.map(|r| r.as_str().to_string()).unwrap_or_default()
}

fn record_to_wire(record: &PaymentRecord) -> PaymentRecord_ {
    PaymentRecord_ {
        transaction_id: record.transaction_id.clone(),
        order_id: record.order_id.to_string(),
        user_id: record.user_id.to_string(),
        amount: record.amount.to_string(),
        refunded_amount: record.refunded_amount.to_string(),
        currency: record.currency.clone(),
        status: status_to_wire(record.status) as i32,
        failure_reason: failure_reason_str(record.failure_reason),
        created_at: record.created_at.to_rfc3339(),
        updated_at: record.updated_at.to_rfc3339(),
        last_refund_id: record.last_refund_id.clone().unwrap_or_default(),
    }
}

// proto's generated message is also named `PaymentRecord`; alias to avoid
// clashing with our domain type of the same name.
use proto::PaymentRecord as PaymentRecord_;

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(raw).map_err(|_| Status::invalid_argument(format!("invalid {field}: {raw}")))
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal, Status> {
    Decimal::from_str(raw).map_err(|_| Status::invalid_argument(format!("invalid {field}: {raw}")))
}

#[tonic::async_trait]
impl<R: PaymentRepository + 'static> GrpcService for PaymentGrpc<R> {
    async fn process_payment(
        &self,
        request: Request<ProcessPaymentRequest>,
    ) -> Result<Response<PaymentRecord_>, Status> {
        let req = request.into_inner();
        let order_id = parse_uuid(&req.order_id, "order_id")?;
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let amount = parse_decimal(&req.amount, "amount")?;

        let record = self
            .engine
            .process_payment(EngineRequest {
                order_id,
                user_id,
                amount,
                currency: req.currency,
                method: req.method,
                description: req.description,
            })
            .await
            .map_err(Into::into)?;

        Ok(Response::new(record_to_wire(&record)))
    }

    async fn get_payment_status(
        &self,
        request: Request<GetPaymentStatusRequest>,
    ) -> Result<Response<PaymentRecord_>, Status> {
        let req = request.into_inner();
        let record = match req.lookup {
            Some(get_payment_status_request::Lookup::TransactionId(id)) => {
                self.engine.get_by_transaction_id(&id).await
            }
            Some(get_payment_status_request::Lookup::OrderId(order_id)) => {
                let order_id = parse_uuid(&order_id, "order_id")?;
                self.engine.get_by_order_id(order_id).await
            }
            None => return Err(Status::invalid_argument("transaction_id or order_id is required")),
        }
        .map_err(Into::into)?;

        Ok(Response::new(record_to_wire(&record)))
    }

    async fn refund_payment(
        &self,
        request: Request<RefundPaymentRequest>,
    ) -> Result<Response<PaymentRecord_>, Status> {
        let req = request.into_inner();
        let amount = parse_decimal(&req.amount, "amount")?;
        let record = self
            .engine
            .refund_payment(&req.transaction_id, amount, &req.reason)
            .await
            .map_err(Into::into)?;
        Ok(Response::new(record_to_wire(&record)))
    }
}
