//! Route definitions for the `/orders` resource and deliveries.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /                           -> list_orders
/// POST   /                           -> create_order
/// GET    /export                     -> export_orders (CSV)
/// GET    /{id}                       -> get_order
/// PUT    /{id}/status                -> update_order_status
/// POST   /{id}/delivery              -> create_delivery
/// PUT    /{id}/delivery/status       -> update_delivery_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route("/export", get(orders::export_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/status", put(orders::update_order_status))
        .route("/{id}/delivery", post(orders::create_delivery))
        .route("/{id}/delivery/status", put(orders::update_delivery_status))
}
