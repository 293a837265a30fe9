//! HTTP-level tests for admin user management.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_staff_cannot_manage_users(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_and_list_users(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "email": "New.Staff@Test.com",
        "full_name": "New Staff",
        "password": "long-enough-password",
        "role": "staff"
    });
    let response = post_json_auth(app.clone(), "/api/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["email"], "new.staff@test.com");
    assert_eq!(created["data"]["role"], "staff");

    let response = get_auth(app, "/api/users?role=staff", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["id"], created["data"]["id"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_user_rejects_bad_input(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let bad_email = json!({
        "email": "not-an-email",
        "full_name": "X",
        "password": "long-enough-password",
        "role": "staff"
    });
    let response = post_json_auth(app.clone(), "/api/users", bad_email, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bad_role = json!({
        "email": "x@test.com",
        "full_name": "X",
        "password": "long-enough-password",
        "role": "superuser"
    });
    let response = post_json_auth(app.clone(), "/api/users", bad_role, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let short_password = json!({
        "email": "x@test.com",
        "full_name": "X",
        "password": "short",
        "role": "staff"
    });
    let response = post_json_auth(app, "/api/users", short_password, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_email_conflicts(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    common::create_user(&pool, "taken@test.com", "staff").await;
    let app = common::build_test_app(pool);

    let body = json!({
        "email": "taken@test.com",
        "full_name": "Second",
        "password": "long-enough-password",
        "role": "staff"
    });
    let response = post_json_auth(app, "/api/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_role_and_deactivate(pool: PgPool) {
    let (admin, token) = common::token_for_role(&pool, "boss@test.com", "admin").await;
    let user = common::create_user(&pool, "ops@test.com", "staff").await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/users/{}", user.id);
    let response = put_json_auth(app.clone(), &uri, json!({ "role": "admin" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "admin");

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &uri, &token).await;
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    // Admins cannot deactivate themselves.
    let response = delete_auth(app, &format!("/api/users/{}", admin.id), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
