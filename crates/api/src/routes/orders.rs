//! Order checkout, lifecycle and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{OrderId, ShopId, UserId};
use domain::{
    AggregateTotals, BuyerSnapshot, CartItem, Order, OrderStatus, PaymentInfo, PaymentStatus,
    ShippingAddress, TrackingInfo,
};
use fulfillment::{
    InMemoryEmailSender, InMemoryNotificationService, LifecycleResult, OrderCoordinator,
    PlaceOrder, SideEffects, StatusUpdate,
};
use serde::{Deserialize, Serialize};
use store::MarketplaceStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: MarketplaceStore> {
    pub coordinator: OrderCoordinator<S, InMemoryNotificationService, InMemoryEmailSender>,
    pub notifier: InMemoryNotificationService,
    pub mailer: InMemoryEmailSender,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub cart: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub user: BuyerSnapshot,
    pub payment: PaymentRequest,
    #[serde(default)]
    pub totals: AggregateTotals,
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
    /// Declared method, e.g. "Credit Card" or "Cash on Delivery".
    pub method: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub courier_partner: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Default)]
pub struct RefundRequest {
    /// Requested refund-track status; defaults to "Processing refund".
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub orders: Vec<Order>,
    pub effects: SideEffects,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub order: Order,
    pub effects: SideEffects,
}

impl From<LifecycleResult<Order>> for OrderResponse {
    fn from(result: LifecycleResult<Order>) -> Self {
        Self {
            order: result.value,
            effects: result.effects,
        }
    }
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub count: usize,
}

impl From<Vec<Order>> for OrderListResponse {
    fn from(orders: Vec<Order>) -> Self {
        Self {
            count: orders.len(),
            orders,
        }
    }
}

// -- Handlers --

/// POST /orders: checkout a cart into one order per seller.
#[tracing::instrument(skip(state, req), fields(items = req.cart.len()))]
pub async fn create<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let payment_info = PaymentInfo::new(req.payment.id, req.payment.status, req.payment.method);

    let result = state
        .coordinator
        .create_order(PlaceOrder {
            cart: req.cart,
            shipping_address: req.shipping_address,
            user: req.user,
            payment_info,
            totals: req.totals,
        })
        .await?;

    let response = CheckoutResponse {
        orders: result.value,
        effects: result.effects,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders/{id}: load one order.
#[tracing::instrument(skip(state))]
pub async fn get<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.coordinator.get_order(order_id).await?;
    Ok(Json(order))
}

/// PUT /orders/{id}/status: generic status update with optional tracking.
#[tracing::instrument(skip(state, req), fields(status = %req.status))]
pub async fn update_status<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status: OrderStatus = req.status.parse()?;

    let tracking = TrackingInfo {
        tracking_number: req.tracking_number,
        courier_partner: req.courier_partner,
        estimated_delivery: req.estimated_delivery,
    };
    let mut update = StatusUpdate::new(status).with_tracking(tracking);
    update.note = req.note;

    let result = state
        .coordinator
        .transition_status(order_id, update)
        .await?;
    Ok(Json(result.into()))
}

/// POST /orders/{id}/refund: buyer refund request.
#[tracing::instrument(skip(state, req))]
pub async fn request_refund<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let requested = match req.status {
        Some(status) => status.parse()?,
        None => OrderStatus::ProcessingRefund,
    };

    let result = state
        .coordinator
        .request_refund(order_id, requested)
        .await?;
    Ok(Json(result.into()))
}

/// POST /orders/{id}/refund/confirm: seller confirms the refund was paid.
#[tracing::instrument(skip(state))]
pub async fn confirm_refund<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let result = state.coordinator.confirm_refund(order_id).await?;
    Ok(Json(result.into()))
}

/// POST /orders/{id}/cancel: cancel with an optional reason.
#[tracing::instrument(skip(state, req))]
pub async fn cancel<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let result = state.coordinator.cancel_order(order_id, req.reason).await?;
    Ok(Json(result.into()))
}

/// GET /shops/{id}/orders: a seller's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_shop<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = state.coordinator.orders_for_shop(&ShopId::new(id)).await?;
    Ok(Json(orders.into()))
}

/// GET /users/{id}/orders: a buyer's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<S: MarketplaceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = state.coordinator.orders_for_user(&UserId::new(id)).await?;
    Ok(Json(orders.into()))
}

fn parse_order_id(s: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(s)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
