// ============================================================================
// ROCKET PARTS PLATFORM - INVENTORY SERVICE ENTRYPOINT
// ============================================================================
// Module: inventory-service/src/main.rs
// Description: Boots the inventory gRPC server plus the reservation
//              sweeper (spec.md §4.8), mirroring the teacher's src/main.rs
//              startup sequence (tracing init -> config load -> services
//              -> router/server).
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rocketparts_inventory::config::InventoryConfig;
use rocketparts_inventory::grpc::InventoryGrpc;
use rocketparts_inventory::{InMemoryInventoryRepository, InventoryService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rocketparts_inventory=info,tonic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = InventoryConfig::load()?;
    info!(service = %config.common.service_name, "configuration loaded");

    let repo = InMemoryInventoryRepository::shared();
    let service = Arc::new(InventoryService::new(
        repo,
        config.reservation.default_ttl_minutes,
        config.reservation.max_ttl_minutes,
    ));

    tokio::spawn(rocketparts_inventory::sweeper::run(
        service.clone(),
        Duration::from_secs(config.reservation.sweep_interval_secs),
    ));

    let addr = format!("{}:{}", config.common.server.host, config.common.server.port).parse()?;
    info!(%addr, "inventory gRPC server listening");

    Server::builder()
        .add_service(InventoryGrpc::new(service).into_server())
        .serve(addr)
        .await?;

    Ok(())
}
