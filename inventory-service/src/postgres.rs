// ============================================================================
// ROCKET PARTS PLATFORM - POSTGRES INVENTORY REPOSITORY
// ============================================================================
// Module: inventory-service/src/postgres.rs
// Description: Production-deployment InventoryRepository backed by sqlx +
//              Postgres, grounded on the teacher's `sqlx::query_as::<_, T>`
//              repository style (commerce/src/services.rs). Reservations
//              are explicitly out of scope for persistence (spec.md §1
//              non-goals: "no persistent reservation storage") so they are
//              not written here; a fresh process starts with none and
//              relies on the sweeper/service layer to rebuild state from
//              live traffic, exactly as the in-memory build does.
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocketparts_shared::error::{Error, Result};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Category, Dimensions, InventoryItem, ItemStatus};
use crate::repository::InventoryRepository;

#[derive(FromRow)]
struct ItemRow {
    item_id: Uuid,
    sku: String,
    name: String,
    description: String,
    category: String,
    stock_level: i32,
    reserved_stock: i32,
    total_stock: i32,
    min_stock_level: i32,
    max_stock_level: i32,
    unit_price: Decimal,
    currency: String,
    weight_kg: Decimal,
    dimensions: serde_json::Value,
    specifications: serde_json::Value,
    status: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for InventoryItem {
    type Error = Error;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(InventoryItem {
            item_id: row.item_id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            category: parse_category(&row.category),
            stock_level: row.stock_level,
            reserved_stock: row.reserved_stock,
            total_stock: row.total_stock,
            min_stock_level: row.min_stock_level,
            max_stock_level: row.max_stock_level,
            unit_price: row.unit_price,
            currency: row.currency,
            weight_kg: row.weight_kg,
            dimensions: serde_json::from_value(row.dimensions).unwrap_or_default(),
            specifications: serde_json::from_value::<HashMap<String, String>>(row.specifications)
                .unwrap_or_default(),
            status: parse_status(&row.status),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            reservations: HashMap::new(),
        })
    }
}

fn category_str(c: Category) -> &'static str {
    match c {
        Category::Unspecified => "unspecified",
        Category::Engines => "engines",
        Category::FuelTanks => "fuel_tanks",
        Category::Navigation => "navigation",
        Category::Structural => "structural",
        Category::Electronics => "electronics",
        Category::LifeSupport => "life_support",
        Category::Payload => "payload",
        Category::LandingGear => "landing_gear",
    }
}

fn parse_category(s: &str) -> Category {
    match s {
        "engines" => Category::Engines,
        "fuel_tanks" => Category::FuelTanks,
        "navigation" => Category::Navigation,
        "structural" => Category::Structural,
        "electronics" => Category::Electronics,
        "life_support" => Category::LifeSupport,
        "payload" => Category::Payload,
        "landing_gear" => Category::LandingGear,
        _ => Category::Unspecified,
    }
}

fn status_str(s: ItemStatus) -> &'static str {
    match s {
        ItemStatus::Unspecified => "unspecified",
        ItemStatus::Active => "active",
        ItemStatus::Discontinued => "discontinued",
        ItemStatus::OutOfStock => "out_of_stock",
        ItemStatus::Backordered => "backordered",
        ItemStatus::Incoming => "incoming",
    }
}

fn parse_status(s: &str) -> ItemStatus {
    match s {
        "active" => ItemStatus::Active,
        "discontinued" => ItemStatus::Discontinued,
        "out_of_stock" => ItemStatus::OutOfStock,
        "backordered" => ItemStatus::Backordered,
        "incoming" => ItemStatus::Incoming,
        _ => ItemStatus::Unspecified,
    }
}

pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn save(&self, item: InventoryItem) -> Result<InventoryItem> {
        let result = sqlx::query(
            r#"
            INSERT INTO inventory_items
                (item_id, sku, name, description, category, stock_level, reserved_stock,
                 total_stock, min_stock_level, max_stock_level, unit_price, currency,
                 weight_kg, dimensions, specifications, status, version, created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)
            ON CONFLICT (item_id) DO UPDATE SET
                sku = EXCLUDED.sku, name = EXCLUDED.name, description = EXCLUDED.description,
                category = EXCLUDED.category, stock_level = EXCLUDED.stock_level,
                reserved_stock = EXCLUDED.reserved_stock, total_stock = EXCLUDED.total_stock,
                min_stock_level = EXCLUDED.min_stock_level, max_stock_level = EXCLUDED.max_stock_level,
                unit_price = EXCLUDED.unit_price, currency = EXCLUDED.currency,
                weight_kg = EXCLUDED.weight_kg, dimensions = EXCLUDED.dimensions,
                specifications = EXCLUDED.specifications, status = EXCLUDED.status,
                version = EXCLUDED.version, updated_at = EXCLUDED.updated_at
            WHERE inventory_items.version = EXCLUDED.version - 1
               OR NOT EXISTS (SELECT 1 FROM inventory_items WHERE item_id = EXCLUDED.item_id)
            "#,
        )
        .bind(item.item_id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.description)
        .bind(category_str(item.category))
        .bind(item.stock_level)
        .bind(item.reserved_stock)
        .bind(item.total_stock)
        .bind(item.min_stock_level)
        .bind(item.max_stock_level)
        .bind(item.unit_price)
        .bind(&item.currency)
        .bind(item.weight_kg)
        .bind(serde_json::to_value(item.dimensions).unwrap_or_default())
        .bind(serde_json::to_value(&item.specifications).unwrap_or_default())
        .bind(status_str(item.status))
        .bind(item.version)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::OptimisticConflict {
                entity: "inventory_item".to_string(),
                id: item.item_id.to_string(),
            });
        }
        Ok(item)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<InventoryItem> {
        let row = sqlx::query_as::<_, ItemRow>("SELECT * FROM inventory_items WHERE item_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_by_sku(&self, sku: &str) -> Result<InventoryItem> {
        let row = sqlx::query_as::<_, ItemRow>("SELECT * FROM inventory_items WHERE sku = $1")
            .bind(sku)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_by_category(&self, category: Category) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, ItemRow>("SELECT * FROM inventory_items WHERE category = $1")
            .bind(category_str(category))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_low_stock_items(&self) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT * FROM inventory_items WHERE stock_level <= min_stock_level AND status = 'active'",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_available_items(&self) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT * FROM inventory_items WHERE stock_level > 0 AND status = 'active'",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE item_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("inventory item {id} not found")));
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<InventoryItem>> {
        // Substring fallback per spec.md §4.2 ("text search is an
        // optimization; a substring fallback is acceptable").
        let pattern = format!("%{}%", query.to_lowercase());
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"SELECT * FROM inventory_items
               WHERE lower(name) LIKE $1 OR lower(description) LIKE $1 OR lower(sku) LIKE $1"#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_with_active_reservations(&self) -> Result<Vec<InventoryItem>> {
        // Reservations are not persisted; a Postgres-backed deployment has
        // no durable record of them across restarts (see module doc).
        Ok(Vec::new())
    }
}
