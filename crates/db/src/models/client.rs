//! Client (buyer profile) model and DTOs.

use marketplace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A client row joined with its user's name and email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub user_id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a client profile for an existing user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClient {
    pub user_id: DbId,
    pub shipping_address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// DTO for updating a client. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClient {
    pub shipping_address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}
