//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use marketplace_api::auth::jwt::{generate_access_token, JwtConfig};
use marketplace_api::auth::password::hash_password;
use marketplace_api::config::ServerConfig;
use marketplace_api::router::build_app_router;
use marketplace_api::state::AppState;
use marketplace_core::vendor::VendorStatus;
use marketplace_db::models::category::{Category, CreateCategory};
use marketplace_db::models::client::{Client, CreateClient};
use marketplace_db::models::product::{CreateProduct, Product};
use marketplace_db::models::user::{CreateUser, User};
use marketplace_db::models::vendor::{CreateVendor, Vendor};
use marketplace_db::repositories::{
    CategoryRepo, ClientRepo, ProductRepo, RoleRepo, UserRepo, VendorRepo,
};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123!";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    }
}

/// Build a test `ServerConfig` with safe defaults and a per-run upload dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: test_upload_dir(),
        max_upload_bytes: 1024 * 1024,
        subscription_sweep_secs: 3600,
        jwt: test_jwt_config(),
    }
}

fn test_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("marketplace-test-{}", uuid::Uuid::new_v4()))
}

/// Build the full application router over `pool`, with the production
/// middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the given role.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("role should be seeded by migrations");
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            full_name: format!("Test {email}"),
            phone: None,
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role_id: role.id,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Create a user with `role` and return a valid access token for it.
pub async fn token_for_role(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let user = create_user(pool, email, role).await;
    let token = generate_access_token(user.id, role, &test_jwt_config()).unwrap();
    (user, token)
}

pub async fn admin_token(pool: &PgPool) -> String {
    token_for_role(pool, "admin@test.com", "admin").await.1
}

pub async fn staff_token(pool: &PgPool) -> String {
    token_for_role(pool, "staff@test.com", "staff").await.1
}

/// A client profile over a fresh client-role user.
pub async fn create_client(pool: &PgPool, email: &str) -> Client {
    let user = create_user(pool, email, "client").await;
    ClientRepo::create(
        pool,
        &CreateClient {
            user_id: user.id,
            shipping_address: Some("1 Market Street".to_string()),
            city: Some("Lagos".to_string()),
            country: Some("NG".to_string()),
        },
    )
    .await
    .unwrap()
}

/// A business vendor, approved by a fresh admin.
pub async fn create_approved_vendor(pool: &PgPool, email: &str, company: &str) -> Vendor {
    let user = create_user(pool, email, "client").await;
    let vendor = VendorRepo::create(
        pool,
        &CreateVendor {
            user_id: user.id,
            vendor_type: "business".to_string(),
            display_name: company.to_string(),
            first_name: None,
            last_name: None,
            national_id: None,
            company_name: Some(company.to_string()),
            registration_number: Some("RC-1001".to_string()),
            tax_id: None,
            address: None,
        },
    )
    .await
    .unwrap();
    let approver = create_user(pool, &format!("approver+{email}"), "admin").await;
    VendorRepo::change_status(pool, vendor.id, VendorStatus::Approved, approver.id, None)
        .await
        .unwrap()
}

pub async fn create_category(pool: &PgPool, name: &str, slug: &str) -> Category {
    CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            image_path: None,
        },
    )
    .await
    .unwrap()
}

/// An active product with the given price (minor units) and stock.
pub async fn create_product(
    pool: &PgPool,
    vendor_id: i64,
    category_id: i64,
    sku: &str,
    price: i64,
    stock: i32,
) -> Product {
    ProductRepo::create(
        pool,
        &CreateProduct {
            vendor_id,
            category_id,
            subcategory_id: None,
            name: format!("Product {sku}"),
            description: None,
            sku: sku.to_string(),
            price,
            stock,
            status: Some("active".to_string()),
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

/// GET with a raw `Authorization` header value.
pub async fn get_with_authorization(app: Router, uri: &str, value: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, value)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Send a multipart body built by [`multipart_body`].
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    boundary: &str,
    body: Vec<u8>,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Encode `(field, file_name, bytes)` parts as multipart/form-data.
pub fn multipart_body(boundary: &str, files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, bytes) in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("response body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("response body should be UTF-8")
}
