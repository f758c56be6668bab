// ============================================================================
// ROCKET PARTS PLATFORM - ORDER SERVICE CONFIGURATION
// ============================================================================
// Module: order-service/src/config.rs
// Description: Order-specific tunables (downstream addresses, saga
//              timeouts, reservation ttl) layered on CommonConfig (teacher's
//              config layering convention).
// ============================================================================

use config::ConfigError;
use rocketparts_shared::CommonConfig;

#[derive(Debug, Clone)]
pub struct SagaConfig {
    pub inventory_addr: String,
    pub payment_addr: String,
    pub rpc_timeout_secs: u64,
    pub reservation_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct OrderConfig {
    pub common: CommonConfig,
    pub saga: SagaConfig,
}

impl OrderConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let common = CommonConfig::load("order", 50051)?;
        let saga = SagaConfig {
            inventory_addr: std::env::var("ROCKETPARTS_ORDER_INVENTORY_ADDR")
                .unwrap_or_else(|_| "http://127.0.0.1:50052".to_string()),
            payment_addr: std::env::var("ROCKETPARTS_ORDER_PAYMENT_ADDR")
                .unwrap_or_else(|_| "http://127.0.0.1:50053".to_string()),
            rpc_timeout_secs: std::env::var("ROCKETPARTS_ORDER_RPC_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            reservation_ttl_minutes: std::env::var("ROCKETPARTS_ORDER_RESERVATION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
        };
        Ok(Self { common, saga })
    }
}
