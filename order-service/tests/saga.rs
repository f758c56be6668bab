// ============================================================================
// ROCKET PARTS PLATFORM - SAGA INTEGRATION TESTS
// ============================================================================
// Module: order-service/tests/saga.rs
// Description: Exercises the order orchestrator against real inventory and
//              payment gRPC servers bound to ephemeral ports, matching
//              testable properties 1, 6, and 7 from spec.md §8 (E1/E2/E6
//              scenarios from spec.md §7's scenario table).
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use rocketparts_inventory::domain::Category;
use rocketparts_inventory::{
    InMemoryInventoryRepository, InventoryItem, InventoryRepository, InventoryService,
};
use rocketparts_order::clients::{InventoryClient, PaymentClient};
use rocketparts_order::orchestrator::{CreateOrderRequest, OrderOrchestrator, RequestedLine};
use rocketparts_order::repository::OrderRepository;
use rocketparts_order::{InMemoryOrderRepository, OrderStatus};
use rocketparts_payment::{InMemoryPaymentRepository, PaymentEngine, PaymentEngineConfig};
use rocketparts_shared::events::{EventBus, EventPublisher};
use rocketparts_shared::retry::RetryPolicy;
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};
use uuid::Uuid;

async fn spawn_inventory() -> (String, Uuid, Arc<InMemoryInventoryRepository>) {
    let repo = InMemoryInventoryRepository::shared();
    let item = InventoryItem::new(
        "RKT-ENG-001",
        "Rocket Engine",
        Category::Engines,
        100,
        Decimal::new(150_000, 2),
        10,
        500,
    )
    .unwrap();
    let item_id = item.item_id;
    repo.save(item).await.unwrap();

    let service = Arc::new(InventoryService::new(repo.clone(), 15, 60));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(rocketparts_inventory::grpc::InventoryGrpc::new(service).into_server())
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    (format!("http://{addr}"), item_id, repo)
}

async fn spawn_payment(success_rate: f64) -> String {
    let repo = InMemoryPaymentRepository::shared();
    let engine = Arc::new(PaymentEngine::new(
        repo,
        PaymentEngineConfig {
            processing_time_ms: 1,
            success_rate,
            max_amount: Decimal::new(1_000_000_00, 2),
        },
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(rocketparts_payment::grpc::PaymentGrpc::new(engine).into_server())
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

async fn orchestrator_with(
    inventory_addr: String,
    payment_addr: String,
) -> (
    Arc<OrderOrchestrator<InMemoryOrderRepository>>,
    Arc<InMemoryOrderRepository>,
) {
    // give the servers a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let inventory_channel = Channel::from_shared(inventory_addr).unwrap().connect_lazy();
    let payment_channel = Channel::from_shared(payment_addr).unwrap().connect_lazy();
    let retry = RetryPolicy::new(3, Duration::from_millis(50));
    let timeout = Duration::from_secs(5);

    let inventory = InventoryClient::new(inventory_channel, retry, timeout);
    let payment = PaymentClient::new(payment_channel, retry, timeout);
    let publisher = EventPublisher::new(EventBus::new());
    let repository = InMemoryOrderRepository::shared();

    let orchestrator = Arc::new(OrderOrchestrator::new(
        repository.clone(),
        inventory,
        payment,
        publisher,
        15,
    ));

    (orchestrator, repository)
}

fn order_request(item_id: Uuid) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: Uuid::new_v4(),
        items: vec![RequestedLine {
            item_id,
            sku: "RKT-ENG-001".to_string(),
            quantity: 2,
        }],
        currency: "USD".to_string(),
        payment_method: "card".to_string(),
    }
}

#[tokio::test]
async fn successful_saga_reserves_pays_and_marks_order_paid() {
    let (inventory_addr, item_id, inventory_repo) = spawn_inventory().await;
    let payment_addr = spawn_payment(1.0).await;
    let (orchestrator, _repo) = orchestrator_with(inventory_addr, payment_addr).await;

    let order = orchestrator
        .create_order(order_request(item_id))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Paid);
    assert!(order.paid_at.is_some());
    assert_eq!(order.total_amount, Decimal::new(300_000, 2));

    // spec.md E1: confirmation converts the hold into a sale — stock_level
    // stays debited and the reservation is gone from both reserved_stock
    // and total_stock.
    let item = inventory_repo.find_by_id(item_id).await.unwrap();
    assert_eq!(item.stock_level, 98);
    assert_eq!(item.reserved_stock, 0);
    assert_eq!(item.total_stock, 98);
}

#[tokio::test]
async fn failed_payment_marks_order_failed_and_releases_reservation() {
    let (inventory_addr, item_id, _inventory_repo) = spawn_inventory().await;
    let payment_addr = spawn_payment(0.0).await;
    let (orchestrator, _repo) = orchestrator_with(inventory_addr, payment_addr).await;

    let order = orchestrator
        .create_order(order_request(item_id))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Failed);
    assert!(order.paid_at.is_none());
}

#[tokio::test]
async fn unknown_sku_fails_validation_before_any_reservation() {
    let (inventory_addr, _item_id, _inventory_repo) = spawn_inventory().await;
    let payment_addr = spawn_payment(1.0).await;
    let (orchestrator, repo) = orchestrator_with(inventory_addr, payment_addr).await;

    let mut request = order_request(Uuid::new_v4());
    request.items[0].sku = "RKT-MISSING".to_string();

    let err = orchestrator.create_order(request).await.unwrap_err();
    assert!(matches!(err, rocketparts_shared::error::Error::Validation(_)));

    let page = repo
        .list(
            None,
            None,
            rocketparts_shared::types::Pagination {
                limit: Some(10),
                offset: Some(0),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn empty_item_list_is_rejected_before_any_rpc() {
    let (inventory_addr, _item_id, _inventory_repo) = spawn_inventory().await;
    let payment_addr = spawn_payment(1.0).await;
    let (orchestrator, _repo) = orchestrator_with(inventory_addr, payment_addr).await;

    let request = CreateOrderRequest {
        user_id: Uuid::new_v4(),
        items: vec![],
        currency: "USD".to_string(),
        payment_method: "card".to_string(),
    };

    let err = orchestrator.create_order(request).await.unwrap_err();
    assert!(matches!(err, rocketparts_shared::error::Error::Validation(_)));
}

#[tokio::test]
async fn requesting_more_than_available_stock_fails_validation() {
    let (inventory_addr, item_id, _inventory_repo) = spawn_inventory().await;
    let payment_addr = spawn_payment(1.0).await;
    let (orchestrator, _repo) = orchestrator_with(inventory_addr, payment_addr).await;

    let mut request = order_request(item_id);
    request.items[0].quantity = 10_000;

    let err = orchestrator.create_order(request).await.unwrap_err();
    assert!(matches!(err, rocketparts_shared::error::Error::Validation(_)));
}
