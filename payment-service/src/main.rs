// ============================================================================
// ROCKET PARTS PLATFORM - PAYMENT SERVICE ENTRYPOINT
// ============================================================================
// Module: payment-service/src/main.rs
// Description: Boots the payment gRPC server.
// ============================================================================

use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rocketparts_payment::config::PaymentConfig;
use rocketparts_payment::grpc::PaymentGrpc;
use rocketparts_payment::{InMemoryPaymentRepository, PaymentEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rocketparts_payment=info,tonic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PaymentConfig::load()?;
    info!(service = %config.common.service_name, success_rate = config.engine.success_rate, "configuration loaded");

    let repo = InMemoryPaymentRepository::shared();
    let engine = Arc::new(PaymentEngine::new(repo, config.engine));

    let addr = format!("{}:{}", config.common.server.host, config.common.server.port).parse()?;
    info!(%addr, "payment gRPC server listening");

    Server::builder()
        .add_service(PaymentGrpc::new(engine).into_server())
        .serve(addr)
        .await?;

    Ok(())
}
