//! HTTP-level tests for vendor registration, approval, soft delete, notes and
//! payment methods.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, body_text, delete_auth, get_auth, post_auth, post_json_auth, put_json_auth,
};
use marketplace_db::repositories::{RoleRepo, UserRepo};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn register_business(app: axum::Router, token: &str, user_id: i64, name: &str) -> Value {
    let body = json!({
        "user_id": user_id,
        "company_name": name,
        "registration_number": "RC-1001",
        "tax_id": "TIN-77"
    });
    let response = post_json_auth(app, "/api/vendors/business", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_individual_vendor(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "ada@test.com", "client").await;
    let app = common::build_test_app(pool.clone());

    let body = json!({
        "user_id": user.id,
        "first_name": " Ada ",
        "last_name": "Obi",
        "national_id": "NIN-123"
    });
    let response = post_json_auth(app, "/api/vendors/individual", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let vendor = body_json(response).await["data"].clone();
    assert_eq!(vendor["display_name"], "Ada Obi");
    assert_eq!(vendor["vendor_type"], "individual");
    assert_eq!(vendor["status"], "pending");

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    let role = RoleRepo::resolve_name(&pool, user.role_id).await.unwrap();
    assert_eq!(role, "vendor");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_registration_validates_type_fields(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "ada@test.com", "client").await;
    let app = common::build_test_app(pool);

    let missing_national_id = json!({
        "user_id": user.id,
        "first_name": "Ada",
        "last_name": "Obi"
    });
    let response =
        post_json_auth(app.clone(), "/api/vendors/individual", missing_national_id, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("national_id"));

    let missing_registration = json!({ "user_id": user.id, "company_name": "Acme" });
    let response =
        post_json_auth(app, "/api/vendors/business", missing_registration, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_can_only_hold_one_vendor(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "acme@test.com", "client").await;
    let app = common::build_test_app(pool);

    register_business(app.clone(), &token, user.id, "Acme").await;

    let body = json!({
        "user_id": user.id,
        "company_name": "Acme Two",
        "registration_number": "RC-2"
    });
    let response = post_json_auth(app, "/api/vendors/business", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_approval_workflow(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let staff = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "acme@test.com", "client").await;
    let app = common::build_test_app(pool);

    let vendor = register_business(app.clone(), &staff, user.id, "Acme").await;
    let base = format!("/api/vendors/{}", vendor["id"]);

    // Staff may not approve.
    let response = post_auth(app.clone(), &format!("{base}/approve"), &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Rejection needs a reason.
    let response =
        post_json_auth(app.clone(), &format!("{base}/reject"), json!({}), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_auth(app.clone(), &format!("{base}/approve"), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let approved = body_json(response).await["data"].clone();
    assert_eq!(approved["status"], "approved");
    assert!(approved["approved_at"].is_string());

    // Approved vendors cannot be approved again.
    let response = post_auth(app.clone(), &format!("{base}/approve"), &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        app.clone(),
        &format!("{base}/suspend"),
        json!({ "reason": "Chargebacks" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "suspended");

    let response = get_auth(app, "/api/vendors?status=suspended", &staff).await;
    assert_eq!(body_json(response).await["data"]["total"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_soft_delete_and_restore(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let user = common::create_user(&pool, "acme@test.com", "client").await;
    let app = common::build_test_app(pool);

    let vendor = register_business(app.clone(), &admin, user.id, "Acme").await;
    let uri = format!("/api/vendors/{}", vendor["id"]);

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app.clone(), "/api/vendors", &admin).await;
    assert_eq!(body_json(response).await["data"]["total"], 0);

    let response = get_auth(app.clone(), "/api/vendors?include_deleted=true", &admin).await;
    assert_eq!(body_json(response).await["data"]["total"], 1);

    let response = post_auth(app.clone(), &format!("{uri}/restore"), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_recomputes_display_name(pool: PgPool) {
    let staff = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "acme@test.com", "client").await;
    let app = common::build_test_app(pool);

    let vendor = register_business(app.clone(), &staff, user.id, "Acme").await;
    let uri = format!("/api/vendors/{}", vendor["id"]);

    let response =
        put_json_auth(app.clone(), &uri, json!({ "company_name": "Acme Ltd" }), &staff).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["display_name"], "Acme Ltd");

    // Blanking a required field for the vendor's type is rejected.
    let response = put_json_auth(app, &uri, json!({ "company_name": "  " }), &staff).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_notes(pool: PgPool) {
    let staff = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "acme@test.com", "client").await;
    let app = common::build_test_app(pool);

    let vendor = register_business(app.clone(), &staff, user.id, "Acme").await;
    let notes = format!("/api/vendors/{}/notes", vendor["id"]);

    let response =
        post_json_auth(app.clone(), &notes, json!({ "body": "Called about KYC" }), &staff).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let note = body_json(response).await["data"].clone();

    let response = post_json_auth(app.clone(), &notes, json!({ "body": "   " }), &staff).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app.clone(), &notes, &staff).await;
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["body"], "Called about KYC");

    let response = delete_auth(app, &format!("{notes}/{}", note["id"]), &staff).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_payment_method_default_handling(pool: PgPool) {
    let staff = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "acme@test.com", "client").await;
    let app = common::build_test_app(pool);

    let vendor = register_business(app.clone(), &staff, user.id, "Acme").await;
    let methods = format!("/api/vendors/{}/payment-methods", vendor["id"]);

    let bank = json!({
        "method_type": "bank_transfer",
        "account_name": "Acme Ltd",
        "account_number": "0123456789",
        "provider": "First Bank"
    });
    let response = post_json_auth(app.clone(), &methods, bank, &staff).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await["data"].clone();
    assert_eq!(first["is_default"], true);

    let momo = json!({
        "method_type": "mobile_money",
        "account_name": "Acme Ltd",
        "account_number": "08030000000"
    });
    let response = post_json_auth(app.clone(), &methods, momo, &staff).await;
    let second = body_json(response).await["data"].clone();
    assert_eq!(second["is_default"], false);

    let response = put_json_auth(
        app.clone(),
        &format!("{methods}/{}/default", second["id"]),
        json!({}),
        &staff,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_default"], true);

    let response = get_auth(app.clone(), &methods, &staff).await;
    let listed = body_json(response).await["data"].clone();
    assert_eq!(listed[0]["id"], second["id"]);
    assert_eq!(listed[1]["is_default"], false);

    let bad_type = json!({
        "method_type": "cheque",
        "account_name": "Acme",
        "account_number": "1"
    });
    let response = post_json_auth(app, &methods, bad_type, &staff).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_export_vendors_csv(pool: PgPool) {
    let staff = common::staff_token(&pool).await;
    let user = common::create_user(&pool, "acme@test.com", "client").await;
    let app = common::build_test_app(pool);

    register_business(app.clone(), &staff, user.id, "Acme, Inc").await;

    let response = get_auth(app, "/api/vendors/export", &staff).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"vendors-"));

    let text = body_text(response).await;
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("id,display_name,vendor_type,status"));
    assert!(lines.next().unwrap().contains("\"Acme, Inc\""));
}
