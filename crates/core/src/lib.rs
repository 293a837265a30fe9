//! Marketplace domain logic.
//!
//! Pure functions and types shared by the database and API layers. Nothing
//! in this crate touches the network or the database.

#[macro_use]
mod macros;

pub mod catalog;
pub mod csv;
pub mod error;
pub mod money;
pub mod order;
pub mod pagination;
pub mod roles;
pub mod subscription;
pub mod types;
pub mod upload;
pub mod vendor;
pub mod wallet;
