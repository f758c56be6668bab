// ============================================================================
// ROCKET PARTS PLATFORM - ORDER DOMAIN MODEL
// ============================================================================
// Module: order-service/src/domain.rs
// Description: Order aggregate + OrderItem (spec.md §3/§5). Status
//              transitions are guarded; invalid transitions fail with a
//              validation error except for the assembly-event path, where
//              spec.md §4.5 requires idempotence (already-assembled/
//              completed is a no-op, not a fatal error).
// ============================================================================

use chrono::{DateTime, Utc};
use rocketparts_shared::error::Error;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Assembled,
    Completed,
    Cancelled,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Assembled => "assembled",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        }
    }

    /// Whether `self -> next` is an allowed status transition (spec.md
    /// §3: "Status transitions are guarded; invalid transitions fail with
    /// a validation error").
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Paid, Assembled)
                | (Assembled, Completed)
        )
    }
}

/// Immutable after creation (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub assembled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

pub struct NewOrderItem {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl Order {
    pub fn new(user_id: Uuid, items: Vec<NewOrderItem>, currency: &str) -> Result<Self, Error> {
        if items.is_empty() {
            return Err(Error::Validation("order must have at least one item".into()));
        }
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut total_amount = Decimal::ZERO;
        let order_items = items
            .into_iter()
            .map(|i| {
                let line_total = i.unit_price * Decimal::from(i.quantity);
                total_amount += line_total;
                OrderItem {
                    id: Uuid::new_v4(),
                    order_id: id,
                    item_id: i.item_id,
                    item_name: i.item_name,
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                    line_total,
                }
            })
            .collect();

        Ok(Self {
            id,
            user_id,
            status: OrderStatus::Pending,
            items: order_items,
            total_amount,
            currency: currency.to_string(),
            created_at: now,
            updated_at: now,
            paid_at: None,
            assembled_at: None,
            completed_at: None,
            deleted_at: None,
        })
    }

    fn transition(&mut self, next: OrderStatus) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            return Err(Error::Validation(format!(
                "cannot transition order {} from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_paid(&mut self) -> Result<(), Error> {
        self.transition(OrderStatus::Paid)?;
        self.paid_at = Some(self.updated_at);
        Ok(())
    }

    pub fn mark_failed(&mut self) -> Result<(), Error> {
        self.transition(OrderStatus::Failed)
    }

    pub fn mark_cancelled(&mut self) -> Result<(), Error> {
        self.transition(OrderStatus::Cancelled)
    }

    /// spec.md §4.5: assembly handler must be idempotent with respect to
    /// already-assembled/completed orders (invalid-transition is a no-op).
    pub fn mark_assembled_then_completed(&mut self) {
        if self.status != OrderStatus::Paid {
            return;
        }
        let now = Utc::now();
        self.status = OrderStatus::Assembled;
        self.assembled_at = Some(now);
        self.updated_at = now;

        self.status = OrderStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn items() -> Vec<NewOrderItem> {
        vec![NewOrderItem {
            item_id: Uuid::new_v4(),
            item_name: "Rocket Engine".into(),
            quantity: 2,
            unit_price: dec!(1500.00),
        }]
    }

    #[test]
    fn new_order_computes_total_from_line_items() {
        let order = Order::new(Uuid::new_v4(), items(), "USD").unwrap();
        assert_eq!(order.total_amount, dec!(3000.00));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn empty_items_is_rejected() {
        let err = Order::new(Uuid::new_v4(), vec![], "USD").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn pending_to_paid_to_assembled_to_completed() {
        let mut order = Order::new(Uuid::new_v4(), items(), "USD").unwrap();
        order.mark_paid().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert!(order.paid_at.is_some());

        order.mark_assembled_then_completed();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.assembled_at.is_some());
        assert!(order.completed_at.is_some());
    }

    #[test]
    fn redelivered_assembly_event_does_not_change_timestamps() {
        let mut order = Order::new(Uuid::new_v4(), items(), "USD").unwrap();
        order.mark_paid().unwrap();
        order.mark_assembled_then_completed();
        let first_assembled = order.assembled_at;
        let first_completed = order.completed_at;

        order.mark_assembled_then_completed();
        assert_eq!(order.assembled_at, first_assembled);
        assert_eq!(order.completed_at, first_completed);
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let mut order = Order::new(Uuid::new_v4(), items(), "USD").unwrap();
        let err = order.transition(OrderStatus::Completed).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
