//! Well-known role name constants.
//!
//! These must match the seed rows in `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_VENDOR: &str = "vendor";
pub const ROLE_CLIENT: &str = "client";

/// All role names accepted on user creation.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STAFF, ROLE_VENDOR, ROLE_CLIENT];

/// Whether the role may use the admin dashboard.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_STAFF
}
