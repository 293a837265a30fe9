//! Route definitions for the `/products` resource and product images.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{images, products};
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                           -> list_products
/// POST   /                           -> create_product
/// GET    /export                     -> export_products (CSV)
/// GET    /{id}                       -> get_product
/// PUT    /{id}                       -> update_product
/// DELETE /{id}                       -> delete_product (admin, soft)
/// GET    /{id}/images                -> list_images
/// POST   /{id}/images                -> upload_images (multipart)
/// DELETE /{id}/images/{image_id}     -> delete_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route("/export", get(products::export_products))
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/{id}/images",
            get(images::list_images).post(images::upload_images),
        )
        .route("/{id}/images/{image_id}", delete(images::delete_image))
}
