//! Handlers for the `/orders` resource and order deliveries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use marketplace_core::csv::{opt, CsvWriter};
use marketplace_core::error::CoreError;
use marketplace_core::money::format_minor;
use marketplace_core::order::{validate_lines, DeliveryStatus, OrderStatus};
use marketplace_core::pagination::{Page, PageRequest};
use marketplace_core::types::{DbId, Timestamp};
use marketplace_db::models::order::{
    CreateDelivery, CreateOrder, Delivery, Order, OrderDetail, OrderQuery,
};
use marketplace_db::repositories::{ClientRepo, DeliveryRepo, OrderRepo};
use serde::Deserialize;

use super::export::csv_attachment;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::query::non_empty;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /orders` and `GET /orders/export`.
#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
    pub client_id: Option<DbId>,
    pub vendor_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderListParams {
    fn to_query(&self) -> AppResult<OrderQuery> {
        let status = non_empty(&self.status);
        if let Some(s) = status.as_deref() {
            s.parse::<OrderStatus>()?;
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
            }
        }
        Ok(OrderQuery {
            status,
            client_id: self.client_id,
            vendor_id: self.vendor_id,
            from: self.from,
            to: self.to,
        })
    }
}

/// Request body for status changes on orders and deliveries.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<DataResponse<Page<Order>>>> {
    let page = PageRequest::new(params.limit, params.offset);
    let filter = params.to_query()?;

    let items = OrderRepo::list(&state.pool, &filter, page).await?;
    let total = OrderRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// POST /api/orders
///
/// Places the order in one transaction: stock is checked and decremented
/// under row locks and lines are priced from the current product rows. The
/// client's saved address is used when none is given.
pub async fn create_order(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(mut input): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderDetail>>)> {
    let lines: Vec<(DbId, i32)> = input
        .items
        .iter()
        .map(|l| (l.product_id, l.quantity))
        .collect();
    validate_lines(&lines)?;

    input.shipping_address = non_empty(&input.shipping_address);
    if input.shipping_address.is_none() {
        let client = ClientRepo::find_by_id(&state.pool, input.client_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: input.client_id,
            }))?;
        input.shipping_address = client.shipping_address;
    }

    let detail = OrderRepo::place(&state.pool, &input).await?;
    tracing::info!(order_id = detail.order.id, placed_by = staff.user_id, "Order created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let detail = OrderRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Order", id }))?;

    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/orders/{id}/status
///
/// Cancelling returns the ordered quantities to stock.
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Order>>> {
    let next = input.status.trim().parse::<OrderStatus>()?;
    let order = OrderRepo::update_status(&state.pool, id, next).await?;

    tracing::info!(
        order_id = id,
        status = %order.status,
        changed_by = staff.user_id,
        "Order status changed"
    );
    Ok(Json(DataResponse { data: order }))
}

/// GET /api/orders/export
pub async fn export_orders(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<OrderListParams>,
) -> AppResult<Response> {
    let filter = params.to_query()?;
    let orders = OrderRepo::list_all(&state.pool, &filter).await?;

    let mut csv = CsvWriter::new(&[
        "id",
        "order_number",
        "client",
        "status",
        "subtotal",
        "shipping_fee",
        "total",
        "shipping_address",
        "created_at",
    ]);
    for o in &orders {
        csv.row([
            o.id.to_string(),
            opt(o.order_number.as_deref()),
            o.client_name.clone(),
            o.status.clone(),
            format_minor(o.subtotal),
            format_minor(o.shipping_fee),
            format_minor(o.total),
            opt(o.shipping_address.as_deref()),
            o.created_at.to_rfc3339(),
        ]);
    }

    Ok(csv_attachment("orders", csv.finish()))
}

// ---------------------------------------------------------------------------
// Deliveries
// ---------------------------------------------------------------------------

/// POST /api/orders/{id}/delivery
///
/// One delivery per order; a second attempt is a 409.
pub async fn create_delivery(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(mut input): Json<CreateDelivery>,
) -> AppResult<(StatusCode, Json<DataResponse<Delivery>>)> {
    input.carrier = input.carrier.trim().to_string();
    if input.carrier.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "carrier is required".into(),
        )));
    }
    input.tracking_number = non_empty(&input.tracking_number);

    let delivery = DeliveryRepo::create(&state.pool, id, &input).await?;
    tracing::info!(
        order_id = id,
        delivery_id = delivery.id,
        carrier = %delivery.carrier,
        "Delivery created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: delivery })))
}

/// PUT /api/orders/{id}/delivery/status
pub async fn update_delivery_status(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Delivery>>> {
    let next = input.status.trim().parse::<DeliveryStatus>()?;
    let delivery = DeliveryRepo::update_status(&state.pool, id, next).await?;

    Ok(Json(DataResponse { data: delivery }))
}
