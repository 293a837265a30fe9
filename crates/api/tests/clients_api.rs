//! HTTP-level tests for client profiles.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_client_for_client_user(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let buyer = common::create_user(&pool, "alice@test.com", "client").await;
    let seller = common::create_user(&pool, "bob@test.com", "vendor").await;
    let app = common::build_test_app(pool);

    let body = json!({ "user_id": buyer.id, "shipping_address": "5 Elm Road", "city": "Accra" });
    let response = post_json_auth(app.clone(), "/api/clients", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let client = body_json(response).await["data"].clone();
    assert_eq!(client["email"], "alice@test.com");
    assert_eq!(client["city"], "Accra");

    let response = post_json_auth(app.clone(), "/api/clients", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json!({ "user_id": seller.id });
    let response = post_json_auth(app.clone(), "/api/clients", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(app, "/api/clients", json!({ "user_id": 999999 }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_search_and_update(pool: PgPool) {
    let token = common::staff_token(&pool).await;
    let alice = common::create_client(&pool, "alice@test.com").await;
    common::create_client(&pool, "carol@test.com").await;
    let app = common::build_test_app(pool);

    let page = body_json(get_auth(app.clone(), "/api/clients", &token).await).await["data"].clone();
    assert_eq!(page["total"], 2);

    let response = get_auth(app.clone(), "/api/clients?search=ALICE", &token).await;
    let page = body_json(response).await["data"].clone();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], alice.id);

    let uri = format!("/api/clients/{}", alice.id);
    let response = put_json_auth(app.clone(), &uri, json!({ "city": "Nairobi" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["city"], "Nairobi");
    assert_eq!(updated["shipping_address"], "1 Market Street");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_soft_delete_is_admin_only(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let staff = common::staff_token(&pool).await;
    let alice = common::create_client(&pool, "alice@test.com").await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/clients/{}", alice.id);
    let response = delete_auth(app.clone(), &uri, &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &uri, &staff).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let page = body_json(get_auth(app.clone(), "/api/clients", &staff).await).await["data"].clone();
    assert_eq!(page["total"], 0);

    let response = delete_auth(app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
