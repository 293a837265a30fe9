//! Request handlers, one submodule per resource.
//!
//! Handlers extract state and the caller's role, validate input, delegate to
//! the repositories in `marketplace_db`, and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod auth;
pub mod categories;
pub mod clients;
pub mod dashboard;
pub mod export;
pub mod images;
pub mod orders;
pub mod products;
pub mod subscriptions;
pub mod users;
pub mod vendors;
pub mod wallet;
