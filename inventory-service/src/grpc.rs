// ============================================================================
// ROCKET PARTS PLATFORM - INVENTORY GRPC SERVER
// ============================================================================
// Module: inventory-service/src/grpc.rs
// Description: tonic server implementation wiring the wire types from
//              proto/inventory.proto (spec.md §6) onto InventoryService
//              (spec.md §4.3).
// ============================================================================

use std::sync::Arc;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::domain::{InventoryItem, ItemStatus};
use crate::repository::InventoryRepository;
use crate::service::{InventoryService as Service, ReservationRequestItem};

pub mod proto {
    tonic::include_proto!("rocketparts.inventory.v1");
}

use proto::inventory_service_server::{InventoryService as GrpcService, InventoryServiceServer};
use proto::*;

pub struct InventoryGrpc<R: InventoryRepository> {
    service: Arc<Service<R>>,
}

impl<R: InventoryRepository + 'static> InventoryGrpc<R> {
    pub fn new(service: Arc<Service<R>>) -> Self {
        Self { service }
    }

    pub fn into_server(self) -> InventoryServiceServer<Self> {
        InventoryServiceServer::new(self)
    }
}

fn category_from_wire(c: i32) -> Category {
    match Category::try_from(c) {
        Ok(Category::CategoryEngines) => crate::domain::Category::Engines,
        Ok(Category::CategoryFuelTanks) => crate::domain::Category::FuelTanks,
        Ok(Category::CategoryNavigation) => crate::domain::Category::Navigation,
        Ok(Category::CategoryStructural) => crate::domain::Category::Structural,
        Ok(Category::CategoryElectronics) => crate::domain::Category::Electronics,
        Ok(Category::CategoryLifeSupport) => crate::domain::Category::LifeSupport,
        Ok(Category::CategoryPayload) => crate::domain::Category::Payload,
        Ok(Category::CategoryLandingGear) => crate::domain::Category::LandingGear,
        _ => crate::domain::Category::Unspecified,
    }
}

fn category_to_wire(c: crate::domain::Category) -> Category {
    match c {
        crate::domain::Category::Unspecified => Category::CategoryUnspecified,
        crate::domain::Category::Engines => Category::CategoryEngines,
        crate::domain::Category::FuelTanks => Category::CategoryFuelTanks,
        crate::domain::Category::Navigation => Category::CategoryNavigation,
        crate::domain::Category::Structural => Category::CategoryStructural,
        crate::domain::Category::Electronics => Category::CategoryElectronics,
        crate::domain::Category::LifeSupport => Category::CategoryLifeSupport,
        crate::domain::Category::Payload => Category::CategoryPayload,
        crate::domain::Category::LandingGear => Category::CategoryLandingGear,
    }
}

fn status_to_wire(s: ItemStatus) -> proto::ItemStatus {
    match s {
        ItemStatus::Unspecified => proto::ItemStatus::ItemStatusUnspecified,
        ItemStatus::Active => proto::ItemStatus::ItemStatusActive,
        ItemStatus::Discontinued => proto::ItemStatus::ItemStatusDiscontinued,
        ItemStatus::OutOfStock => proto::ItemStatus::ItemStatusOutOfStock,
        ItemStatus::Backordered => proto::ItemStatus::ItemStatusBackordered,
        ItemStatus::Incoming => proto::ItemStatus::ItemStatusIncoming,
    }
}

fn item_to_wire(item: &InventoryItem) -> Item {
    Item {
        item_id: item.item_id.to_string(),
        sku: item.sku.clone(),
        name: item.name.clone(),
        description: item.description.clone(),
        category: category_to_wire(item.category) as i32,
        stock_level: item.stock_level,
        reserved_stock: item.reserved_stock,
        total_stock: item.total_stock,
        min_stock_level: item.min_stock_level,
        max_stock_level: item.max_stock_level,
        unit_price: item.unit_price.to_string(),
        currency: item.currency.clone(),
        status: status_to_wire(item.status) as i32,
        version: item.version,
    }
}

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(raw).map_err(|_| Status::invalid_argument(format!("invalid {field}: {raw}")))
}

#[tonic::async_trait]
impl<R: InventoryRepository + 'static> GrpcService for InventoryGrpc<R> {
    async fn check_availability(
        &self,
        request: Request<CheckAvailabilityRequest>,
    ) -> Result<Response<CheckAvailabilityResponse>, Status> {
        let req = request.into_inner();
        let items: Vec<ReservationRequestItem> = req
            .items
            .into_iter()
            .map(|i| ReservationRequestItem {
                sku: i.sku,
                quantity: i.quantity,
            })
            .collect();

        let report = self
            .service
            .check_availability(&items)
            .await
            .map_err(Into::into)?;

        Ok(Response::new(CheckAvailabilityResponse {
            items: report
                .items
                .into_iter()
                .map(|i| ItemAvailability {
                    sku: i.sku,
                    available: i.available,
                    name: i.name.unwrap_or_default(),
                    unit_price: i.unit_price.map(|p| p.to_string()).unwrap_or_default(),
                    current_stock: i.current_stock,
                    reason: i.reason.unwrap_or_default().to_string(),
                })
                .collect(),
            all_available: report.all_available,
        }))
    }

    async fn reserve_items(
        &self,
        request: Request<ReserveItemsRequest>,
    ) -> Result<Response<ReserveItemsResponse>, Status> {
        let req = request.into_inner();
        let order_id = parse_uuid(&req.order_id, "order_id")?;
        let items: Vec<ReservationRequestItem> = req
            .items
            .into_iter()
            .map(|i| ReservationRequestItem {
                sku: i.sku,
                quantity: i.quantity,
            })
            .collect();

        let outcome = self
            .service
            .reserve_items(order_id, &items, req.ttl_minutes)
            .await
            .map_err(Into::into)?;

        Ok(Response::new(ReserveItemsResponse {
            reservation_id: outcome.reservation_id,
            expires_at: outcome.expires_at.to_rfc3339(),
        }))
    }

    async fn confirm_reservation(
        &self,
        request: Request<ConfirmReservationRequest>,
    ) -> Result<Response<ConfirmReservationResponse>, Status> {
        let req = request.into_inner();
        let order_id = parse_uuid(&req.order_id, "order_id")?;
        let results = self
            .service
            .confirm_reservation(order_id)
            .await
            .map_err(Into::into)?;

        Ok(Response::new(ConfirmReservationResponse {
            results: results
                .into_iter()
                .map(|r| ItemOpResult {
                    item_id: r.item_id.to_string(),
                    success: r.success,
                    error: r.error.unwrap_or_default(),
                })
                .collect(),
        }))
    }

    async fn release_reservation(
        &self,
        request: Request<ReleaseReservationRequest>,
    ) -> Result<Response<ReleaseReservationResponse>, Status> {
        let req = request.into_inner();
        let order_id = parse_uuid(&req.order_id, "order_id")?;
        let results = self
            .service
            .release_reservation(order_id, &req.reason)
            .await
            .map_err(Into::into)?;

        Ok(Response::new(ReleaseReservationResponse {
            results: results
                .into_iter()
                .map(|r| ItemOpResult {
                    item_id: r.item_id.to_string(),
                    success: r.success,
                    error: r.error.unwrap_or_default(),
                })
                .collect(),
        }))
    }

    async fn get_item(&self, request: Request<GetItemRequest>) -> Result<Response<Item>, Status> {
        let req = request.into_inner();
        let item = match req.lookup {
            Some(get_item_request::Lookup::ItemId(id)) => {
                let id = parse_uuid(&id, "item_id")?;
                self.service.get_item_by_id(id).await
            }
            Some(get_item_request::Lookup::Sku(sku)) => self.service.get_item_by_sku(&sku).await,
            None => return Err(Status::invalid_argument("item_id or sku is required")),
        }
        .map_err(Into::into)?;

        Ok(Response::new(item_to_wire(&item)))
    }

    async fn search_items(
        &self,
        request: Request<SearchItemsRequest>,
    ) -> Result<Response<SearchItemsResponse>, Status> {
        let req = request.into_inner();
        let items = self
            .service
            .search_items(&req.query)
            .await
            .map_err(Into::into)?;
        Ok(Response::new(SearchItemsResponse {
            items: items.iter().map(item_to_wire).collect(),
        }))
    }

    async fn update_stock(
        &self,
        request: Request<UpdateStockRequest>,
    ) -> Result<Response<Item>, Status> {
        let req = request.into_inner();
        let item = self
            .service
            .update_stock(&req.sku, req.delta, &req.reason, &req.actor)
            .await
            .map_err(Into::into)?;
        Ok(Response::new(item_to_wire(&item)))
    }

    async fn get_low_stock_items(
        &self,
        _request: Request<GetLowStockItemsRequest>,
    ) -> Result<Response<GetLowStockItemsResponse>, Status> {
        let items = self
            .service
            .get_low_stock_items()
            .await
            .map_err(Into::into)?;
        Ok(Response::new(GetLowStockItemsResponse {
            items: items
                .into_iter()
                .map(|(item, days)| LowStockItem {
                    item: Some(item_to_wire(&item)),
                    days_of_stock: days.unwrap_or_default(),
                    has_days_of_stock: days.is_some(),
                })
                .collect(),
        }))
    }

    async fn get_items_by_category(
        &self,
        request: Request<GetItemsByCategoryRequest>,
    ) -> Result<Response<SearchItemsResponse>, Status> {
        let req = request.into_inner();
        let category = category_from_wire(req.category);
        let items = self
            .service
            .get_items_by_category(category)
            .await
            .map_err(Into::into)?;
        Ok(Response::new(SearchItemsResponse {
            items: items.iter().map(item_to_wire).collect(),
        }))
    }
}
