//! Subscriptions, wallet payment, and cash-out processing.

mod common;

use assert_matches::assert_matches;
use marketplace_core::error::CoreError;
use marketplace_db::error::DbError;
use marketplace_db::models::subscription::{CreatePlan, CreateSubscription};
use marketplace_db::models::vendor::CreatePaymentMethod;
use marketplace_db::models::wallet::{CreateCashOut, LedgerEntry};
use marketplace_db::repositories::{
    CashOutRepo, PaymentMethodRepo, SubscriptionPlanRepo, SubscriptionRepo, WalletRepo,
};
use sqlx::PgPool;

fn plan(name: &str, price: i64) -> CreatePlan {
    CreatePlan {
        name: name.to_string(),
        description: None,
        price,
        billing_cycle: "monthly".to_string(),
        product_limit: Some(50),
    }
}

fn fund(amount: i64) -> LedgerEntry {
    LedgerEntry {
        amount,
        description: None,
        reference: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subscribe_paid_from_wallet(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "sub@example.com", "Sub Co").await;
    let plan = SubscriptionPlanRepo::create(&pool, &plan("Pro", 2_000)).await.unwrap();
    WalletRepo::credit(&pool, vendor.user_id, &fund(5_000)).await.unwrap();

    let sub = SubscriptionRepo::create(
        &pool,
        &CreateSubscription {
            vendor_id: vendor.id,
            plan_id: plan.id,
            pay_from_wallet: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(sub.status, "active");
    assert_eq!(sub.plan_name, "Pro");
    assert!(sub.transaction_id.is_some());
    assert!(sub.ends_at > sub.starts_at);

    let wallet = WalletRepo::find_by_user_id(&pool, vendor.user_id).await.unwrap().unwrap();
    assert_eq!(wallet.balance, 3_000);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_active_subscription_conflicts(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "dup@example.com", "Dup Co").await;
    let plan = SubscriptionPlanRepo::create(&pool, &plan("Basic", 0)).await.unwrap();
    let input = CreateSubscription {
        vendor_id: vendor.id,
        plan_id: plan.id,
        pay_from_wallet: false,
    };

    let first = SubscriptionRepo::create(&pool, &input).await.unwrap();
    let err = SubscriptionRepo::create(&pool, &input).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));

    SubscriptionRepo::cancel(&pool, first.id).await.unwrap();
    let again = SubscriptionRepo::create(&pool, &input).await.unwrap();
    assert_eq!(again.status, "active");

    let err = SubscriptionRepo::cancel(&pool, first.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unfunded_subscription_leaves_nothing_behind(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "poor@example.com", "Poor Co").await;
    let plan = SubscriptionPlanRepo::create(&pool, &plan("Pro", 2_000)).await.unwrap();

    let err = SubscriptionRepo::create(
        &pool,
        &CreateSubscription {
            vendor_id: vendor.id,
            plan_id: plan.id,
            pay_from_wallet: true,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::InsufficientFunds { .. }));

    let active = SubscriptionRepo::find_active_for_vendor(&pool, vendor.id)
        .await
        .unwrap();
    assert!(active.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expire_lapsed(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "old@example.com", "Old Co").await;
    let plan = SubscriptionPlanRepo::create(&pool, &plan("Basic", 0)).await.unwrap();
    let sub = SubscriptionRepo::create(
        &pool,
        &CreateSubscription {
            vendor_id: vendor.id,
            plan_id: plan.id,
            pay_from_wallet: false,
        },
    )
    .await
    .unwrap();
    sqlx::query("UPDATE subscriptions SET ends_at = NOW() - INTERVAL '1 day' WHERE id = $1")
        .bind(sub.id)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(SubscriptionRepo::expire_lapsed(&pool).await.unwrap(), 1);
    let sub = SubscriptionRepo::find_by_id(&pool, sub.id).await.unwrap().unwrap();
    assert_eq!(sub.status, "expired");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lapsed_subscription_does_not_block_renewal(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "renew@example.com", "Renew Co").await;
    let plan = SubscriptionPlanRepo::create(&pool, &plan("Basic", 0)).await.unwrap();
    let input = CreateSubscription {
        vendor_id: vendor.id,
        plan_id: plan.id,
        pay_from_wallet: false,
    };

    let old = SubscriptionRepo::create(&pool, &input).await.unwrap();
    sqlx::query("UPDATE subscriptions SET ends_at = NOW() - INTERVAL '1 day' WHERE id = $1")
        .bind(old.id)
        .execute(&pool)
        .await
        .unwrap();

    let renewed = SubscriptionRepo::create(&pool, &input).await.unwrap();
    assert_eq!(renewed.status, "active");
    assert!(renewed.ends_at > renewed.starts_at);

    let old = SubscriptionRepo::find_by_id(&pool, old.id).await.unwrap().unwrap();
    assert_eq!(old.status, "expired");
    assert_eq!(SubscriptionRepo::expire_lapsed(&pool).await.unwrap(), 0);

    let active = SubscriptionRepo::find_active_for_vendor(&pool, vendor.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, renewed.id);
}

async fn pending_cash_out(pool: &PgPool, balance: i64, amount: i64) -> (i64, i64) {
    let vendor = common::create_approved_vendor(pool, "cash@example.com", "Cash Co").await;
    let method = PaymentMethodRepo::create(
        pool,
        vendor.id,
        &CreatePaymentMethod {
            method_type: "mobile_money".to_string(),
            account_name: "Cash Co".to_string(),
            account_number: "0800000000".to_string(),
            provider: None,
        },
    )
    .await
    .unwrap();
    let wallet = WalletRepo::credit(pool, vendor.user_id, &fund(balance))
        .await
        .unwrap()
        .wallet;
    let request = CashOutRepo::create(
        pool,
        &CreateCashOut {
            wallet_id: wallet.id,
            vendor_id: vendor.id,
            payment_method_id: method.id,
            amount,
        },
    )
    .await
    .unwrap();
    (request.id, vendor.user_id)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_cash_out_debits_wallet(pool: PgPool) {
    let (request_id, user_id) = pending_cash_out(&pool, 10_000, 4_000).await;
    let admin = common::create_user(&pool, "admin@example.com", "admin").await;

    let paid = CashOutRepo::approve(&pool, request_id, admin.id).await.unwrap();
    assert_eq!(paid.status, "paid");
    assert_eq!(paid.processed_by, Some(admin.id));
    assert!(paid.transaction_id.is_some());

    let wallet = WalletRepo::find_by_user_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(wallet.balance, 6_000);

    let err = CashOutRepo::approve(&pool, request_id, admin.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_without_funds_stays_pending(pool: PgPool) {
    let (request_id, user_id) = pending_cash_out(&pool, 5_000, 5_000).await;
    let admin = common::create_user(&pool, "admin@example.com", "admin").await;
    WalletRepo::debit(&pool, user_id, &fund(1_000)).await.unwrap();

    let err = CashOutRepo::approve(&pool, request_id, admin.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::InsufficientFunds { .. }));

    let request = CashOutRepo::find_by_id(&pool, request_id).await.unwrap().unwrap();
    assert_eq!(request.status, "pending");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reject_cash_out_keeps_balance(pool: PgPool) {
    let (request_id, user_id) = pending_cash_out(&pool, 5_000, 2_000).await;
    let admin = common::create_user(&pool, "admin@example.com", "admin").await;

    let rejected = CashOutRepo::reject(&pool, request_id, admin.id, "Account mismatch")
        .await
        .unwrap();
    assert_eq!(rejected.status, "rejected");
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Account mismatch"));

    let wallet = WalletRepo::find_by_user_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(wallet.balance, 5_000);
}
