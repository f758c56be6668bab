// ============================================================================
// ROCKET PARTS PLATFORM - INVENTORY DOMAIN MODEL
// ============================================================================
// Module: inventory-service/src/domain.rs
// Description: InventoryItem aggregate (stock, reservations, status) per
//              spec.md §3/§4.1. All mutating operations are inherent
//              methods that keep the aggregate's invariants intact in one
//              call; the repository (see repository.rs) is the only thing
//              that persists the result.
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use rocketparts_shared::error::Error;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Unspecified,
    Engines,
    FuelTanks,
    Navigation,
    Structural,
    Electronics,
    LifeSupport,
    Payload,
    LandingGear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Unspecified,
    Active,
    Discontinued,
    OutOfStock,
    Backordered,
    Incoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Dimensions {
    pub length_cm: u32,
    pub width_cm: u32,
    pub height_cm: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Active,
    Confirmed,
    Expired,
    Cancelled,
}

/// A hold on stock for one order against one item, per spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub reserved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: ReservationStatus,
}

/// Aggregate root. Identified by `item_id`, uniquely keyed by `sku`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub stock_level: i32,
    pub reserved_stock: i32,
    pub total_stock: i32,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub unit_price: Decimal,
    pub currency: String,
    pub weight_kg: Decimal,
    pub dimensions: Dimensions,
    pub specifications: HashMap<String, String>,
    pub status: ItemStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// order_id -> active (or terminal, briefly, until swept) reservation.
    pub reservations: HashMap<Uuid, Reservation>,
}

impl InventoryItem {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        initial_stock: i32,
        unit_price: Decimal,
        min_stock_level: i32,
        max_stock_level: i32,
    ) -> Result<Self, Error> {
        if unit_price < Decimal::ZERO {
            return Err(Error::Validation("unit_price must be >= 0".into()));
        }
        if min_stock_level > max_stock_level {
            return Err(Error::Validation(
                "min_stock_level must be <= max_stock_level".into(),
            ));
        }
        let now = Utc::now();
        let mut item = Self {
            item_id: Uuid::new_v4(),
            sku: sku.into(),
            name: name.into(),
            description: String::new(),
            category,
            stock_level: initial_stock,
            reserved_stock: 0,
            total_stock: initial_stock,
            min_stock_level,
            max_stock_level,
            unit_price,
            currency: "USD".to_string(),
            weight_kg: Decimal::ZERO,
            dimensions: Dimensions::default(),
            specifications: HashMap::new(),
            status: ItemStatus::Active,
            version: 1,
            created_at: now,
            updated_at: now,
            reservations: HashMap::new(),
        };
        item.recompute_status();
        Ok(item)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Status transitions derive from stock (spec.md §3): active <-> out of
    /// stock. Discontinued is terminal and never touched here.
    fn recompute_status(&mut self) {
        if self.status == ItemStatus::Discontinued {
            return;
        }
        self.status = if self.stock_level <= 0 {
            ItemStatus::OutOfStock
        } else {
            ItemStatus::Active
        };
    }

    pub fn discontinue(&mut self) {
        self.status = ItemStatus::Discontinued;
        self.touch();
    }

    /// spec.md §4.1 AddStock.
    pub fn add_stock(&mut self, qty: i32, _reason: &str) -> Result<(), Error> {
        if qty <= 0 {
            return Err(Error::Validation("quantity must be > 0".into()));
        }
        self.stock_level += qty;
        self.total_stock += qty;
        self.recompute_status();
        self.touch();
        Ok(())
    }

    /// spec.md §4.1 RemoveStock.
    pub fn remove_stock(&mut self, qty: i32, _reason: &str) -> Result<(), Error> {
        if qty <= 0 {
            return Err(Error::Validation("quantity must be > 0".into()));
        }
        if qty > self.stock_level {
            return Err(Error::InsufficientStock {
                sku: self.sku.clone(),
                requested: qty,
                available: self.stock_level,
            });
        }
        self.stock_level -= qty;
        self.total_stock -= qty;
        self.recompute_status();
        self.touch();
        Ok(())
    }

    pub fn check_availability(&self, qty: i32) -> bool {
        qty > 0 && qty <= self.stock_level
    }

    /// spec.md §4.1 ReserveStock.
    pub fn reserve_stock(
        &mut self,
        order_id: Uuid,
        qty: i32,
        ttl_minutes: i64,
    ) -> Result<&Reservation, Error> {
        if qty <= 0 {
            return Err(Error::Validation("quantity must be > 0".into()));
        }
        if self.reservations.contains_key(&order_id) {
            return Err(Error::Conflict(format!(
                "reservation already exists for order {order_id}"
            )));
        }
        if qty > self.stock_level {
            return Err(Error::InsufficientStock {
                sku: self.sku.clone(),
                requested: qty,
                available: self.stock_level,
            });
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: format!("res_{order_id}_{}", now.timestamp()),
            order_id,
            item_id: self.item_id,
            quantity: qty,
            reserved_at: now,
            expires_at: now + Duration::minutes(ttl_minutes.max(1)),
            status: ReservationStatus::Active,
        };

        self.stock_level -= qty;
        self.reserved_stock += qty;
        self.recompute_status();
        self.touch();

        self.reservations.insert(order_id, reservation);
        Ok(self.reservations.get(&order_id).expect("just inserted"))
    }

    /// spec.md §4.1 ConfirmReservation: converts a reservation into a sale.
    pub fn confirm_reservation(&mut self, order_id: Uuid) -> Result<(), Error> {
        let reservation = self.reservations.remove(&order_id).ok_or_else(|| {
            Error::NotFound(format!("no active reservation for order {order_id}"))
        })?;
        self.reserved_stock -= reservation.quantity;
        self.total_stock -= reservation.quantity;
        self.touch();
        Ok(())
    }

    /// spec.md §4.1 ReleaseReservation: returns stock, does not touch
    /// total_stock.
    pub fn release_reservation(&mut self, order_id: Uuid) -> Result<(), Error> {
        let reservation = self.reservations.remove(&order_id).ok_or_else(|| {
            Error::NotFound(format!("no active reservation for order {order_id}"))
        })?;
        self.stock_level += reservation.quantity;
        self.reserved_stock -= reservation.quantity;
        self.recompute_status();
        self.touch();
        Ok(())
    }

    /// spec.md §4.1 CleanupExpiredReservations. Returns the order ids whose
    /// reservation was released as expired.
    pub fn cleanup_expired_reservations(&mut self, now: DateTime<Utc>) -> Vec<Uuid> {
        let expired: Vec<Uuid> = self
            .reservations
            .values()
            .filter(|r| now > r.expires_at)
            .map(|r| r.order_id)
            .collect();

        for order_id in &expired {
            if let Some(reservation) = self.reservations.remove(order_id) {
                self.stock_level += reservation.quantity;
                self.reserved_stock -= reservation.quantity;
            }
        }
        if !expired.is_empty() {
            self.recompute_status();
            self.touch();
        }
        expired
    }

    pub fn is_low_stock(&self) -> bool {
        self.status == ItemStatus::Active && self.stock_level <= self.min_stock_level
    }

    pub fn is_available(&self) -> bool {
        self.status == ItemStatus::Active && self.stock_level > 0
    }

    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q)
            || self.sku.to_lowercase().contains(&q)
    }

    /// Invariant check used by property tests (spec.md §8 invariant 1).
    #[cfg(test)]
    pub fn check_invariants(&self) -> bool {
        let reserved_sum: i32 = self.reservations.values().map(|r| r.quantity).sum();
        self.stock_level >= 0
            && self.reserved_stock >= 0
            && self.reserved_stock == reserved_sum
            && self.min_stock_level <= self.max_stock_level
            && self.unit_price >= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(stock: i32) -> InventoryItem {
        InventoryItem::new(
            "RKT-ENG-001",
            "Rocket Engine",
            Category::Engines,
            stock,
            Decimal::new(150_000, 2),
            10,
            500,
        )
        .unwrap()
    }

    #[test]
    fn new_item_is_active_when_stocked() {
        let it = item(100);
        assert_eq!(it.status, ItemStatus::Active);
        assert!(it.check_invariants());
    }

    #[test]
    fn zero_stock_item_is_created_out_of_stock() {
        let it = item(0);
        assert_eq!(it.status, ItemStatus::OutOfStock);
    }

    #[test]
    fn reserve_then_release_is_a_no_op_on_pair() {
        let mut it = item(100);
        let before = (it.stock_level, it.reserved_stock);
        let order_id = Uuid::new_v4();
        it.reserve_stock(order_id, 10, 30).unwrap();
        it.release_reservation(order_id).unwrap();
        assert_eq!((it.stock_level, it.reserved_stock), before);
        assert!(it.check_invariants());
    }

    #[test]
    fn reserve_then_confirm_reduces_total_stock_by_exactly_q() {
        let mut it = item(100);
        let total_before = it.total_stock;
        let order_id = Uuid::new_v4();
        it.reserve_stock(order_id, 10, 30).unwrap();
        it.confirm_reservation(order_id).unwrap();
        assert_eq!(it.total_stock, total_before - 10);
        assert_eq!(it.reserved_stock, 0);
        assert!(it.check_invariants());
    }

    #[test]
    fn duplicate_reservation_for_same_order_is_rejected() {
        let mut it = item(100);
        let order_id = Uuid::new_v4();
        it.reserve_stock(order_id, 10, 30).unwrap();
        let err = it.reserve_stock(order_id, 5, 30).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn reserve_more_than_available_fails_insufficient_stock() {
        let mut it = item(5);
        let err = it.reserve_stock(Uuid::new_v4(), 10, 30).unwrap_err();
        assert!(matches!(err, Error::InsufficientStock { .. }));
    }

    #[test]
    fn confirm_without_reservation_fails_not_found() {
        let mut it = item(100);
        let err = it.confirm_reservation(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn expired_reservations_are_released_and_restore_stock() {
        let mut it = item(100);
        let order_id = Uuid::new_v4();
        it.reserve_stock(order_id, 20, 1).unwrap();
        assert_eq!(it.stock_level, 80);

        let future = Utc::now() + Duration::minutes(5);
        let released = it.cleanup_expired_reservations(future);
        assert_eq!(released, vec![order_id]);
        assert_eq!(it.stock_level, 100);
        assert_eq!(it.reserved_stock, 0);
        assert!(it.check_invariants());
    }

    #[test]
    fn stock_depletion_flips_status_to_out_of_stock_and_back() {
        let mut it = item(5);
        it.remove_stock(5, "admin adjustment").unwrap();
        assert_eq!(it.status, ItemStatus::OutOfStock);
        it.add_stock(1, "restock").unwrap();
        assert_eq!(it.status, ItemStatus::Active);
    }

    #[test]
    fn discontinued_status_is_terminal_across_stock_changes() {
        let mut it = item(5);
        it.discontinue();
        it.add_stock(50, "restock").unwrap();
        assert_eq!(it.status, ItemStatus::Discontinued);
    }
}
