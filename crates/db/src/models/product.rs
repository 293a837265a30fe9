//! Product model and DTOs.

use marketplace_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A product row joined with vendor and category display names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub vendor_id: DbId,
    pub vendor_name: String,
    pub category_id: DbId,
    pub category_name: String,
    pub subcategory_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Money,
    pub stock: i32,
    pub status: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub vendor_id: DbId,
    pub category_id: DbId,
    pub subcategory_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Money,
    #[serde(default)]
    pub stock: i32,
    pub status: Option<String>,
}

/// DTO for updating a product. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub category_id: Option<DbId>,
    pub subcategory_id: Option<DbId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i32>,
    pub status: Option<String>,
}

/// Filters for the product list and export.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub vendor_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub subcategory_id: Option<DbId>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
}
