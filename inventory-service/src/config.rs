// ============================================================================
// ROCKET PARTS PLATFORM - INVENTORY SERVICE CONFIGURATION
// ============================================================================
// Module: inventory-service/src/config.rs
// Description: Inventory-specific configuration layered on top of
//              rocketparts_shared::CommonConfig (teacher's config layering
//              convention, see shared::config).
// ============================================================================

use config::ConfigError;
use rocketparts_shared::CommonConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfig {
    pub default_ttl_minutes: i64,
    pub max_ttl_minutes: i64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub common: CommonConfig,
    pub reservation: ReservationConfig,
}

impl InventoryConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let common = CommonConfig::load("inventory", 50052)?;
        let reservation = ReservationConfig {
            default_ttl_minutes: std::env::var("ROCKETPARTS_RESERVATION_DEFAULT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            max_ttl_minutes: std::env::var("ROCKETPARTS_RESERVATION_MAX_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            sweep_interval_secs: std::env::var("ROCKETPARTS_RESERVATION_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        };
        Ok(Self { common, reservation })
    }
}
