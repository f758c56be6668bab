// ============================================================================
// ROCKET PARTS PLATFORM - PAYMENT ENGINE
// ============================================================================
// Module: payment-service/src/engine.rs
// Description: Simulated payment processor (spec.md §4.4). Validates the
//              request, sleeps for a configured processing time, then
//              samples success/failure from a configured success_rate.
// ============================================================================

use chrono::Utc;
use rand::Rng;
use rocketparts_shared::error::{Error, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{FailureReason, PaymentRecord, PaymentStatus};
use crate::repository::PaymentRepository;

#[derive(Debug, Clone, Copy)]
pub struct PaymentEngineConfig {
    pub processing_time_ms: u64,
    pub success_rate: f64,
    pub max_amount: Decimal,
}

impl Default for PaymentEngineConfig {
    fn default() -> Self {
        Self {
            processing_time_ms: 200,
            success_rate: 1.0,
            max_amount: Decimal::new(1_000_000_00, 2),
        }
    }
}

pub struct ProcessPaymentRequest {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
    pub description: String,
}

pub struct PaymentEngine<R: PaymentRepository> {
    repo: Arc<R>,
    config: PaymentEngineConfig,
}

impl<R: PaymentRepository> PaymentEngine<R> {
    pub fn new(repo: Arc<R>, config: PaymentEngineConfig) -> Self {
        Self { repo, config }
    }

    /// spec.md §4.4 ProcessPayment.
    pub async fn process_payment(&self, req: ProcessPaymentRequest) -> Result<PaymentRecord> {
        if req.amount <= Decimal::ZERO || req.amount > self.config.max_amount {
            return Err(Error::Validation(format!(
                "amount {} must be in (0, {}]",
                req.amount, self.config.max_amount
            )));
        }
        if req.currency.len() != 3 {
            return Err(Error::Validation(format!(
                "currency must be a 3-letter code, got {}",
                req.currency
            )));
        }

        tokio::time::sleep(Duration::from_millis(self.config.processing_time_ms)).await;

        let succeeds = rand::thread_rng().gen_bool(self.config.success_rate.clamp(0.0, 1.0));
        let now = Utc::now();
        let transaction_id = format!("txn_{}", Uuid::new_v4().simple());

        let (status, failure_reason) = if succeeds {
            (PaymentStatus::Completed, None)
        } else {
            let reasons = FailureReason::ALL;
            let reason = reasons[rand::thread_rng().gen_range(0..reasons.len())];
            (PaymentStatus::Failed, Some(reason))
        };

        let record = PaymentRecord {
            transaction_id,
            order_id: req.order_id,
            user_id: req.user_id,
            amount: req.amount,
            refunded_amount: Decimal::ZERO,
            currency: req.currency,
            method: req.method,
            description: req.description,
            status,
            failure_reason,
            created_at: now,
            updated_at: now,
            last_refund_id: None,
        };

        let saved = self.repo.insert(record).await?;
        if succeeds {
            info!(order_id = %saved.order_id, transaction_id = %saved.transaction_id, "payment completed");
        } else {
            warn!(
                order_id = %saved.order_id,
                transaction_id = %saved.transaction_id,
                reason = ?saved.failure_reason,
                "payment failed"
            );
        }
        Ok(saved)
    }

    pub async fn get_by_transaction_id(&self, transaction_id: &str) -> Result<PaymentRecord> {
        self.repo.find_by_transaction_id(transaction_id).await
    }

    pub async fn get_by_order_id(&self, order_id: Uuid) -> Result<PaymentRecord> {
        self.repo.find_latest_by_order_id(order_id).await
    }

    /// spec.md §4.4 RefundPayment.
    pub async fn refund_payment(
        &self,
        transaction_id: &str,
        amount: Decimal,
        _reason: &str,
    ) -> Result<PaymentRecord> {
        let mut record = self.repo.find_by_transaction_id(transaction_id).await?;
        record.apply_refund(amount)?;
        self.repo.update(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryPaymentRepository;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal) -> ProcessPaymentRequest {
        ProcessPaymentRequest {
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount,
            currency: "USD".into(),
            method: "card".into(),
            description: "rocket parts order".into(),
        }
    }

    fn fast_config(success_rate: f64) -> PaymentEngineConfig {
        PaymentEngineConfig {
            processing_time_ms: 1,
            success_rate,
            max_amount: dec!(1000000.00),
        }
    }

    #[tokio::test]
    async fn deterministic_success_rate_one_always_completes() {
        let repo = InMemoryPaymentRepository::shared();
        let engine = PaymentEngine::new(repo, fast_config(1.0));
        let record = engine.process_payment(request(dec!(250.00))).await.unwrap();
        assert_eq!(record.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn deterministic_success_rate_zero_always_fails() {
        let repo = InMemoryPaymentRepository::shared();
        let engine = PaymentEngine::new(repo, fast_config(0.0));
        let record = engine.process_payment(request(dec!(250.00))).await.unwrap();
        assert_eq!(record.status, PaymentStatus::Failed);
        assert!(record.failure_reason.is_some());
    }

    #[tokio::test]
    async fn rejects_non_positive_and_over_max_amounts() {
        let repo = InMemoryPaymentRepository::shared();
        let engine = PaymentEngine::new(repo, fast_config(1.0));

        assert!(matches!(
            engine.process_payment(request(dec!(0.00))).await.unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            engine
                .process_payment(request(dec!(2000000.00)))
                .await
                .unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn full_lifecycle_process_then_refund() {
        let repo = InMemoryPaymentRepository::shared();
        let engine = PaymentEngine::new(repo, fast_config(1.0));
        let record = engine.process_payment(request(dec!(100.00))).await.unwrap();

        let refunded = engine
            .refund_payment(&record.transaction_id, dec!(100.00), "customer request")
            .await
            .unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);

        let fetched = engine.get_by_transaction_id(&record.transaction_id).await.unwrap();
        assert_eq!(fetched.status, PaymentStatus::Refunded);
    }
}
