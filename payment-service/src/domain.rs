// ============================================================================
// ROCKET PARTS PLATFORM - PAYMENT DOMAIN MODEL
// ============================================================================
// Module: payment-service/src/domain.rs
// Description: Simulated payment state machine (spec.md §3/§4.4):
//              pending -> (completed | failed); completed/partially_refunded
//              may transition to refunded/partially_refunded via refund.
// ============================================================================

use chrono::{DateTime, Utc};
use rocketparts_shared::error::Error;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

/// Deterministic failure reasons a simulated declined payment can surface
/// (spec.md §4.4: "emits a deterministic failure reason from a small
/// set").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    InsufficientFunds,
    CardDeclined,
    GatewayTimeout,
    FraudSuspected,
}

impl FailureReason {
    pub const ALL: [FailureReason; 4] = [
        FailureReason::InsufficientFunds,
        FailureReason::CardDeclined,
        FailureReason::GatewayTimeout,
        FailureReason::FraudSuspected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InsufficientFunds => "insufficient_funds",
            FailureReason::CardDeclined => "card_declined",
            FailureReason::GatewayTimeout => "gateway_timeout",
            FailureReason::FraudSuspected => "fraud_suspected",
        }
    }
}

/// A payment transaction record. One per `ProcessPayment` call, identified
/// by an opaque `transaction_id` (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub transaction_id: String,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub refunded_amount: Decimal,
    pub currency: String,
    pub method: String,
    pub description: String,
    pub status: PaymentStatus,
    pub failure_reason: Option<FailureReason>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// id of the most recent refund applied to this transaction, of the
    /// form `ref_<ts>_<tx[:8]>` (spec.md §4.4 RefundPayment).
    pub last_refund_id: Option<String>,
}

impl PaymentRecord {
    pub fn outstanding(&self) -> Decimal {
        self.amount - self.refunded_amount
    }

    /// spec.md §4.4 RefundPayment: allowed only from completed or
    /// partially_refunded; amount must be <= outstanding.
    pub fn apply_refund(&mut self, amount: Decimal) -> Result<(), Error> {
        if !matches!(
            self.status,
            PaymentStatus::Completed | PaymentStatus::PartiallyRefunded
        ) {
            return Err(Error::Conflict(format!(
                "cannot refund a payment in status {:?}",
                self.status
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(Error::Validation("refund amount must be > 0".into()));
        }
        if amount > self.outstanding() {
            return Err(Error::Validation(format!(
                "refund amount {amount} exceeds outstanding balance {}",
                self.outstanding()
            )));
        }

        self.refunded_amount += amount;
        self.status = if self.refunded_amount == self.amount {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        let now = Utc::now();
        let tx_prefix: String = self.transaction_id.chars().take(8).collect();
        self.last_refund_id = Some(format!("ref_{}_{tx_prefix}", now.timestamp()));
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn completed(amount: Decimal) -> PaymentRecord {
        let now = Utc::now();
        PaymentRecord {
            transaction_id: "tx_test".into(),
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount,
            refunded_amount: Decimal::ZERO,
            currency: "USD".into(),
            method: "card".into(),
            description: "test".into(),
            status: PaymentStatus::Completed,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            last_refund_id: None,
        }
    }

    #[test]
    fn full_refund_transitions_to_refunded() {
        let mut record = completed(dec!(100.00));
        record.apply_refund(dec!(100.00)).unwrap();
        assert_eq!(record.status, PaymentStatus::Refunded);
        assert_eq!(record.outstanding(), Decimal::ZERO);
        let refund_id = record.last_refund_id.unwrap();
        assert!(refund_id.starts_with("ref_"));
        assert!(refund_id.ends_with("tx_test"));
    }

    #[test]
    fn partial_refund_transitions_to_partially_refunded() {
        let mut record = completed(dec!(100.00));
        record.apply_refund(dec!(40.00)).unwrap();
        assert_eq!(record.status, PaymentStatus::PartiallyRefunded);
        assert_eq!(record.outstanding(), dec!(60.00));

        record.apply_refund(dec!(60.00)).unwrap();
        assert_eq!(record.status, PaymentStatus::Refunded);
    }

    #[test]
    fn refund_beyond_outstanding_is_rejected() {
        let mut record = completed(dec!(100.00));
        let err = record.apply_refund(dec!(150.00)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn refund_on_pending_payment_is_rejected() {
        let mut record = completed(dec!(100.00));
        record.status = PaymentStatus::Pending;
        let err = record.apply_refund(dec!(10.00)).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }
}
