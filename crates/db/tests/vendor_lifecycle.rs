//! Vendor approval workflow, soft delete, notes, and payment methods.

mod common;

use assert_matches::assert_matches;
use marketplace_core::error::CoreError;
use marketplace_core::pagination::PageRequest;
use marketplace_core::vendor::VendorStatus;
use marketplace_db::error::DbError;
use marketplace_db::models::vendor::{CreatePaymentMethod, VendorQuery};
use marketplace_db::repositories::{
    PaymentMethodRepo, RoleRepo, UserRepo, VendorNoteRepo, VendorRepo,
};
use sqlx::PgPool;

fn bank(account: &str) -> CreatePaymentMethod {
    CreatePaymentMethod {
        method_type: "bank_transfer".to_string(),
        account_name: "Acme Ltd".to_string(),
        account_number: account.to_string(),
        provider: Some("First Bank".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_vendor_starts_pending_and_promotes_user(pool: PgPool) {
    let vendor = common::create_vendor(&pool, "acme@example.com", "Acme Ltd").await;
    assert_eq!(vendor.status, "pending");
    assert_eq!(vendor.email, "acme@example.com");

    let user = UserRepo::find_by_id(&pool, vendor.user_id).await.unwrap().unwrap();
    let role = RoleRepo::resolve_name(&pool, user.role_id).await.unwrap();
    assert_eq!(role, "vendor");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_then_suspend(pool: PgPool) {
    let vendor = common::create_vendor(&pool, "flow@example.com", "Flow Co").await;
    let admin = common::create_user(&pool, "admin@example.com", "admin").await;

    let approved =
        VendorRepo::change_status(&pool, vendor.id, VendorStatus::Approved, admin.id, None)
            .await
            .unwrap();
    assert_eq!(approved.status, "approved");
    assert_eq!(approved.approved_by, Some(admin.id));
    assert!(approved.approved_at.is_some());

    let suspended = VendorRepo::change_status(
        &pool,
        vendor.id,
        VendorStatus::Suspended,
        admin.id,
        Some("Chargebacks"),
    )
    .await
    .unwrap();
    assert_eq!(suspended.status, "suspended");
    assert_eq!(suspended.rejection_reason.as_deref(), Some("Chargebacks"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_transition_is_conflict(pool: PgPool) {
    let vendor = common::create_vendor(&pool, "bad@example.com", "Bad Flow").await;
    let admin = common::create_user(&pool, "admin@example.com", "admin").await;

    let err = VendorRepo::change_status(&pool, vendor.id, VendorStatus::Suspended, admin.id, None)
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));

    let unchanged = VendorRepo::find_by_id(&pool, vendor.id, false).await.unwrap().unwrap();
    assert_eq!(unchanged.status, "pending");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_hides_vendor_until_restored(pool: PgPool) {
    let vendor = common::create_vendor(&pool, "gone@example.com", "Gone Co").await;

    assert!(VendorRepo::soft_delete(&pool, vendor.id).await.unwrap());
    assert!(!VendorRepo::soft_delete(&pool, vendor.id).await.unwrap());

    assert!(VendorRepo::find_by_id(&pool, vendor.id, false).await.unwrap().is_none());
    assert!(VendorRepo::find_by_id(&pool, vendor.id, true).await.unwrap().is_some());

    let live = VendorRepo::list(&pool, &VendorQuery::default(), PageRequest::new(None, None))
        .await
        .unwrap();
    assert!(live.iter().all(|v| v.id != vendor.id));

    let with_deleted = VendorQuery {
        include_deleted: true,
        ..Default::default()
    };
    assert_eq!(VendorRepo::count(&pool, &with_deleted).await.unwrap(), 1);

    assert!(VendorRepo::restore(&pool, vendor.id).await.unwrap());
    assert!(VendorRepo::find_by_id(&pool, vendor.id, false).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_status_and_search(pool: PgPool) {
    common::create_vendor(&pool, "one@example.com", "Alpha Traders").await;
    common::create_approved_vendor(&pool, "two@example.com", "Beta Goods").await;

    let approved = VendorQuery {
        status: Some("approved".to_string()),
        ..Default::default()
    };
    let rows = VendorRepo::list(&pool, &approved, PageRequest::new(None, None))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display_name, "Beta Goods");

    let search = VendorQuery {
        search: Some("alpha".to_string()),
        ..Default::default()
    };
    assert_eq!(VendorRepo::count(&pool, &search).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notes_newest_first(pool: PgPool) {
    let vendor = common::create_vendor(&pool, "notes@example.com", "Noted").await;
    let admin = common::create_user(&pool, "admin@example.com", "admin").await;

    VendorNoteRepo::create(&pool, vendor.id, admin.id, "first").await.unwrap();
    let second = VendorNoteRepo::create(&pool, vendor.id, admin.id, "second").await.unwrap();

    let notes = VendorNoteRepo::list_by_vendor(&pool, vendor.id).await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, second.id);

    assert!(VendorNoteRepo::delete(&pool, vendor.id, second.id).await.unwrap());
    assert!(!VendorNoteRepo::delete(&pool, vendor.id, second.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_first_payment_method_is_default(pool: PgPool) {
    let vendor = common::create_vendor(&pool, "pay@example.com", "Payee").await;

    let first = PaymentMethodRepo::create(&pool, vendor.id, &bank("001")).await.unwrap();
    let second = PaymentMethodRepo::create(&pool, vendor.id, &bank("002")).await.unwrap();
    assert!(first.is_default);
    assert!(!second.is_default);

    let switched = PaymentMethodRepo::set_default(&pool, vendor.id, second.id)
        .await
        .unwrap()
        .unwrap();
    assert!(switched.is_default);

    let methods = PaymentMethodRepo::list_by_vendor(&pool, vendor.id).await.unwrap();
    assert_eq!(methods.iter().filter(|m| m.is_default).count(), 1);
    assert_eq!(methods[0].id, second.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_default_promotes_oldest(pool: PgPool) {
    let vendor = common::create_vendor(&pool, "promo@example.com", "Promo").await;
    let first = PaymentMethodRepo::create(&pool, vendor.id, &bank("001")).await.unwrap();
    let second = PaymentMethodRepo::create(&pool, vendor.id, &bank("002")).await.unwrap();

    assert!(PaymentMethodRepo::delete(&pool, vendor.id, first.id).await.unwrap());

    let remaining = PaymentMethodRepo::find_for_vendor(&pool, vendor.id, second.id)
        .await
        .unwrap()
        .unwrap();
    assert!(remaining.is_default);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_set_default_for_other_vendor_is_none(pool: PgPool) {
    let a = common::create_vendor(&pool, "a@example.com", "A").await;
    let b = common::create_vendor(&pool, "b@example.com", "B").await;
    let method = PaymentMethodRepo::create(&pool, a.id, &bank("001")).await.unwrap();

    let result = PaymentMethodRepo::set_default(&pool, b.id, method.id).await.unwrap();
    assert!(result.is_none());
}
