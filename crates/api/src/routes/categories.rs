//! Route definitions for the `/category` resource and its subcategories.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/category`.
///
/// ```text
/// GET    /                                -> list_categories
/// POST   /                                -> create_category
/// GET    /{id}                            -> get_category
/// PUT    /{id}                            -> update_category
/// DELETE /{id}                            -> delete_category (admin)
/// GET    /{id}/subcategories              -> list_subcategories
/// POST   /{id}/subcategories              -> create_subcategory
/// PUT    /{id}/subcategories/{sub_id}     -> update_subcategory
/// DELETE /{id}/subcategories/{sub_id}     -> delete_subcategory (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/{id}/subcategories",
            get(categories::list_subcategories).post(categories::create_subcategory),
        )
        .route(
            "/{id}/subcategories/{sub_id}",
            put(categories::update_subcategory).delete(categories::delete_subcategory),
        )
}
