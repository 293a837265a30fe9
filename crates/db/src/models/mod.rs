//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod category;
pub mod client;
pub mod dashboard;
pub mod image;
pub mod order;
pub mod product;
pub mod role;
pub mod session;
pub mod subscription;
pub mod user;
pub mod vendor;
pub mod wallet;
