// ============================================================================
// ROCKET PARTS PLATFORM - SHARED CONFIGURATION
// ============================================================================
// Module: shared/src/config.rs
// Description: Environment-based configuration pieces common to all three
//              services (server bind address, database, event bus, retry
//              tunables). Each service layers its own domain-specific
//              section (see e.g. inventory-service::config::ReservationConfig)
//              on top of `CommonConfig` using the same `config`/`dotenvy`
//              loader convention as the teacher's `shared::config::AppConfig`.
// ============================================================================

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Server configuration, shared across HTTP (order-service) and gRPC
/// (inventory-service, payment-service) binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

/// Database configuration (teacher's `DatabaseConfig`, trimmed to the
/// fields the repositories actually consult).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Retry tunables for the composable policy in `crate::retry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

/// Event-bus configuration. `redis_url` is carried for parity with a real
/// broker deployment even though this build's `EventBus` is in-process
/// (see shared::events and DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    pub redis_url: String,
    pub publish_retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

/// Configuration common to every service in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub event_bus: EventBusConfig,
    pub logging: LoggingConfig,
    pub service_name: String,
}

impl CommonConfig {
    /// Load configuration for `service_name`, layering (in increasing
    /// priority): built-in defaults, `config/default.toml`,
    /// `config/{service_name}.toml`, `config/local.toml`, then
    /// `ROCKETPARTS__*` / `ROCKETPARTS_{SERVICE}__*` environment
    /// variables. Mirrors the teacher's `AppConfig::load_for_service`.
    pub fn load(service_name: &str, default_port: u16) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", default_port as i64)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default(
                "database.url",
                format!("postgresql://localhost/rocketparts_{service_name}"),
            )?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("event_bus.redis_url", "redis://localhost:6379")?
            .set_default("event_bus.publish_retry.max_attempts", 3)?
            .set_default("event_bus.publish_retry.interval_ms", 500)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("service_name", service_name)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{service_name}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix(&format!("ROCKETPARTS_{}", service_name.to_uppercase()))
                    .separator("__"),
            )
            .add_source(Environment::with_prefix("ROCKETPARTS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_without_any_files_or_env() {
        let cfg = CommonConfig::load("inventory", 50052).expect("defaults must be sufficient");
        assert_eq!(cfg.server.port, 50052);
        assert_eq!(cfg.service_name, "inventory");
        assert_eq!(cfg.event_bus.publish_retry.max_attempts, 3);
    }
}
