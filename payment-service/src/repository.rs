// ============================================================================
// ROCKET PARTS PLATFORM - PAYMENT REPOSITORY
// ============================================================================
// Module: payment-service/src/repository.rs
// Description: In-memory payment ledger (spec.md §4.4: "acceptable for the
//              simulation but implies process-local state"). Concurrent
//              access is guarded by a single reader-writer lock per
//              spec.md's exact wording; `PaymentRepository` isolates this
//              so a real ledger is a drop-in (spec.md §9).
// ============================================================================

use async_trait::async_trait;
use rocketparts_shared::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::PaymentRecord;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, record: PaymentRecord) -> Result<PaymentRecord>;
    async fn update(&self, record: PaymentRecord) -> Result<PaymentRecord>;
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<PaymentRecord>;
    async fn find_latest_by_order_id(&self, order_id: Uuid) -> Result<PaymentRecord>;
}

#[derive(Default)]
struct Ledger {
    by_transaction: HashMap<String, PaymentRecord>,
    /// order_id -> most recent transaction_id, for reverse lookup
    /// (spec.md §4.4: "keyed also by order_id for reverse lookup").
    by_order: HashMap<Uuid, String>,
}

pub struct InMemoryPaymentRepository {
    ledger: RwLock<Ledger>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for InMemoryPaymentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, record: PaymentRecord) -> Result<PaymentRecord> {
        let mut ledger = self.ledger.write().await;
        ledger.by_order.insert(record.order_id, record.transaction_id.clone());
        ledger
            .by_transaction
            .insert(record.transaction_id.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, record: PaymentRecord) -> Result<PaymentRecord> {
        let mut ledger = self.ledger.write().await;
        if !ledger.by_transaction.contains_key(&record.transaction_id) {
            return Err(Error::NotFound(format!(
                "transaction {} not found",
                record.transaction_id
            )));
        }
        ledger
            .by_transaction
            .insert(record.transaction_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<PaymentRecord> {
        let ledger = self.ledger.read().await;
        ledger
            .by_transaction
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("transaction {transaction_id} not found")))
    }

    async fn find_latest_by_order_id(&self, order_id: Uuid) -> Result<PaymentRecord> {
        let ledger = self.ledger.read().await;
        let transaction_id = ledger
            .by_order
            .get(&order_id)
            .ok_or_else(|| Error::NotFound(format!("no payment for order {order_id}")))?;
        ledger
            .by_transaction
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("transaction {transaction_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentStatus;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn record(order_id: Uuid) -> PaymentRecord {
        let now = Utc::now();
        PaymentRecord {
            transaction_id: "tx_1".into(),
            order_id,
            user_id: Uuid::new_v4(),
            amount: Decimal::new(10000, 2),
            refunded_amount: Decimal::ZERO,
            currency: "USD".into(),
            method: "card".into(),
            description: "test".into(),
            status: PaymentStatus::Pending,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            last_refund_id: None,
        }
    }

    #[tokio::test]
    async fn insert_then_find_by_both_keys() {
        let repo = InMemoryPaymentRepository::new();
        let order_id = Uuid::new_v4();
        repo.insert(record(order_id)).await.unwrap();

        let by_tx = repo.find_by_transaction_id("tx_1").await.unwrap();
        assert_eq!(by_tx.order_id, order_id);

        let by_order = repo.find_latest_by_order_id(order_id).await.unwrap();
        assert_eq!(by_order.transaction_id, "tx_1");
    }

    #[tokio::test]
    async fn update_unknown_transaction_fails_not_found() {
        let repo = InMemoryPaymentRepository::new();
        let err = repo.update(record(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
