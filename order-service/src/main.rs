// ============================================================================
// ROCKET PARTS PLATFORM - ORDER SERVICE ENTRYPOINT
// ============================================================================
// Module: order-service/src/main.rs
// Description: Boots the order HTTP API, the gRPC clients to inventory and
//              payment, the saga orchestrator, and the assembly-events
//              consumer (spec.md §4.5-§4.7), mirroring the teacher's
//              src/main.rs startup sequence (tracing init -> config load ->
//              services -> router/server).
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Channel;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rocketparts_order::config::OrderConfig;
use rocketparts_order::events::AssemblyCompletedHandler;
use rocketparts_order::http::{self, AppState};
use rocketparts_order::orchestrator::OrderOrchestrator;
use rocketparts_order::InMemoryOrderRepository;
use rocketparts_shared::events::{EventBus, EventPublisher, EventSubscriber, TOPIC_ASSEMBLY_EVENTS};
use rocketparts_shared::retry::RetryPolicy;

use rocketparts_order::clients::{InventoryClient, PaymentClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rocketparts_order=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = OrderConfig::load()?;
    info!(service = %config.common.service_name, "configuration loaded");

    let inventory_channel = Channel::from_shared(config.saga.inventory_addr.clone())?
        .connect_lazy();
    let payment_channel = Channel::from_shared(config.saga.payment_addr.clone())?.connect_lazy();

    let rpc_timeout = Duration::from_secs(config.saga.rpc_timeout_secs);
    let rpc_retry = RetryPolicy::new(3, Duration::from_secs(1));
    let inventory_client = InventoryClient::new(inventory_channel, rpc_retry, rpc_timeout);
    let payment_client = PaymentClient::new(payment_channel, rpc_retry, rpc_timeout);

    let bus = EventBus::new();
    let publisher = EventPublisher::new(bus.clone());

    let repository = InMemoryOrderRepository::shared();

    let orchestrator = Arc::new(OrderOrchestrator::new(
        repository.clone(),
        inventory_client,
        payment_client,
        publisher,
        config.saga.reservation_ttl_minutes,
    ));

    let subscriber = EventSubscriber::new(bus);
    let assembly_handler = Arc::new(AssemblyCompletedHandler::new(repository.clone()));
    subscriber.spawn(TOPIC_ASSEMBLY_EVENTS, assembly_handler, |e| e.order_id);

    let state = Arc::new(AppState {
        orchestrator,
        repository,
    });

    let addr = format!("{}:{}", config.common.server.host, config.common.server.port).parse()?;
    info!(%addr, "order HTTP server listening");

    let router = http::router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
