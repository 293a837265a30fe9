//! Route definitions for the `/subscriptions` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::subscriptions;
use crate::state::AppState;

/// Routes mounted at `/subscriptions`.
///
/// ```text
/// GET    /                 -> list_subscriptions
/// POST   /                 -> create_subscription
/// GET    /plans            -> list_plans
/// POST   /plans            -> create_plan (admin)
/// PUT    /plans/{id}       -> update_plan (admin)
/// DELETE /plans/{id}       -> delete_plan (admin, deactivates)
/// GET    /{id}             -> get_subscription
/// POST   /{id}/cancel      -> cancel_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/plans",
            get(subscriptions::list_plans).post(subscriptions::create_plan),
        )
        .route(
            "/plans/{id}",
            put(subscriptions::update_plan).delete(subscriptions::delete_plan),
        )
        .route("/{id}", get(subscriptions::get_subscription))
        .route("/{id}/cancel", post(subscriptions::cancel_subscription))
}
