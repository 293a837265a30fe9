//! Order, order item, and delivery models.

use marketplace_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An order row joined with the client's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub order_number: Option<String>,
    pub client_id: DbId,
    pub client_name: String,
    pub status: String,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub shipping_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An order line joined with the product name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub product_id: DbId,
    pub product_name: String,
    pub vendor_id: DbId,
    pub quantity: i32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A requested line of a new order.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderLine {
    pub product_id: DbId,
    pub quantity: i32,
}

/// DTO for placing an order. Prices come from the product rows.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub client_id: DbId,
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub shipping_fee: Money,
    pub items: Vec<OrderLine>,
}

/// Filters for the order list and export.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<String>,
    pub client_id: Option<DbId>,
    pub vendor_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Order with its lines and delivery, for the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub delivery: Option<Delivery>,
}

/// A row from the `deliveries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Delivery {
    pub id: DbId,
    pub order_id: DbId,
    pub carrier: String,
    pub tracking_number: Option<String>,
    pub status: String,
    pub shipped_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDelivery {
    pub carrier: String,
    pub tracking_number: Option<String>,
}
