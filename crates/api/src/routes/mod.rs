pub mod auth;
pub mod categories;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod subscriptions;
pub mod users;
pub mod vendors;
pub mod wallet;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy (see each module for the full table):
///
/// ```text
/// /auth/login, /auth/refresh, /auth/logout, /auth/me
///
/// /users                         user accounts (admin only)
/// /clients                       client profiles and their orders
/// /vendors                       vendors, approval, notes, payment methods
/// /category                      categories and subcategories
/// /products                      products and product images
/// /orders                        orders and deliveries
/// /wallet                        wallets, ledger, cash-out requests
/// /subscriptions                 plans and vendor subscriptions
/// /dashboard/summary             landing page figures
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/clients", clients::router())
        .nest("/vendors", vendors::router())
        .nest("/category", categories::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/wallet", wallet::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/dashboard", dashboard::router())
}
