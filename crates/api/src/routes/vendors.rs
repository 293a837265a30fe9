//! Route definitions for the `/vendors` resource.
//!
//! ```text
//! VENDORS:
//! GET    /                                  list_vendors
//! GET    /export                            export_vendors (CSV)
//! POST   /individual                        create_individual_vendor
//! POST   /business                          create_business_vendor
//! GET    /{id}                              get_vendor
//! PUT    /{id}                              update_vendor
//! DELETE /{id}                              delete_vendor (admin, soft)
//! POST   /{id}/restore                      restore_vendor (admin)
//!
//! APPROVAL (admin):
//! POST   /{id}/approve                      approve_vendor
//! POST   /{id}/reject                       reject_vendor
//! POST   /{id}/suspend                      suspend_vendor
//!
//! NOTES:
//! GET    /{id}/notes                        list_notes
//! POST   /{id}/notes                        create_note
//! DELETE /{id}/notes/{note_id}              delete_note
//!
//! PAYMENT METHODS:
//! GET    /{id}/payment-methods              list_payment_methods
//! POST   /{id}/payment-methods              create_payment_method
//! DELETE /{id}/payment-methods/{pm_id}      delete_payment_method
//! PUT    /{id}/payment-methods/{pm_id}/default  set_default_payment_method
//! ```

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::vendors;
use crate::state::AppState;

/// Routes mounted at `/vendors`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(vendors::list_vendors))
        .route("/export", get(vendors::export_vendors))
        .route("/individual", post(vendors::create_individual_vendor))
        .route("/business", post(vendors::create_business_vendor))
        .route(
            "/{id}",
            get(vendors::get_vendor)
                .put(vendors::update_vendor)
                .delete(vendors::delete_vendor),
        )
        .route("/{id}/restore", post(vendors::restore_vendor))
        .route("/{id}/approve", post(vendors::approve_vendor))
        .route("/{id}/reject", post(vendors::reject_vendor))
        .route("/{id}/suspend", post(vendors::suspend_vendor))
        .route(
            "/{id}/notes",
            get(vendors::list_notes).post(vendors::create_note),
        )
        .route("/{id}/notes/{note_id}", delete(vendors::delete_note))
        .route(
            "/{id}/payment-methods",
            get(vendors::list_payment_methods).post(vendors::create_payment_method),
        )
        .route(
            "/{id}/payment-methods/{pm_id}",
            delete(vendors::delete_payment_method),
        )
        .route(
            "/{id}/payment-methods/{pm_id}/default",
            put(vendors::set_default_payment_method),
        )
}
