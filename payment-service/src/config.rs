// ============================================================================
// ROCKET PARTS PLATFORM - PAYMENT SERVICE CONFIGURATION
// ============================================================================
// Module: payment-service/src/config.rs
// Description: Payment-specific tunables layered on CommonConfig (teacher's
//              config layering convention).
// ============================================================================

use config::ConfigError;
use rocketparts_shared::CommonConfig;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::engine::PaymentEngineConfig;

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub common: CommonConfig,
    pub engine: PaymentEngineConfig,
}

impl PaymentConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let common = CommonConfig::load("payment", 50053)?;
        let processing_time_ms = std::env::var("ROCKETPARTS_PAYMENT_PROCESSING_TIME_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);
        let success_rate = std::env::var("ROCKETPARTS_PAYMENT_SUCCESS_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0);
        let max_amount = std::env::var("ROCKETPARTS_PAYMENT_MAX_AMOUNT")
            .ok()
            .and_then(|v| Decimal::from_str(&v).ok())
            .unwrap_or_else(|| Decimal::new(1_000_000_00, 2));

        Ok(Self {
            common,
            engine: PaymentEngineConfig {
                processing_time_ms,
                success_rate,
                max_amount,
            },
        })
    }
}
