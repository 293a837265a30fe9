//! Vendor, vendor note, and vendor payment method models.

use marketplace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `vendors` table joined with the owning user's email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vendor {
    pub id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub vendor_type: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub company_name: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a vendor. Type-specific validation happens before this.
#[derive(Debug, Clone)]
pub struct CreateVendor {
    pub user_id: DbId,
    pub vendor_type: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub company_name: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// DTO for updating vendor profile fields. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVendor {
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub company_name: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// Filters for the vendor list and export.
#[derive(Debug, Clone, Default)]
pub struct VendorQuery {
    pub status: Option<String>,
    pub vendor_type: Option<String>,
    pub search: Option<String>,
    pub include_deleted: bool,
}

/// A row from the `vendor_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorNote {
    pub id: DbId,
    pub vendor_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `vendor_payment_methods` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentMethod {
    pub id: DbId,
    pub vendor_id: DbId,
    pub method_type: String,
    pub account_name: String,
    pub account_number: String,
    pub provider: Option<String>,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a payment method.
#[derive(Debug, Clone)]
pub struct CreatePaymentMethod {
    pub method_type: String,
    pub account_name: String,
    pub account_number: String,
    pub provider: Option<String>,
}
