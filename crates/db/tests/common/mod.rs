//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use marketplace_core::roles::ROLE_CLIENT;
use marketplace_core::vendor::VendorStatus;
use marketplace_db::models::category::{Category, CreateCategory};
use marketplace_db::models::client::{Client, CreateClient};
use marketplace_db::models::product::{CreateProduct, Product};
use marketplace_db::models::user::{CreateUser, User};
use marketplace_db::models::vendor::{CreateVendor, Vendor};
use marketplace_db::repositories::{
    CategoryRepo, ClientRepo, ProductRepo, RoleRepo, UserRepo, VendorRepo,
};
use sqlx::PgPool;

pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            full_name: format!("User {email}"),
            phone: None,
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

pub async fn create_client(pool: &PgPool, email: &str) -> Client {
    let user = create_user(pool, email, ROLE_CLIENT).await;
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

/// A pending business vendor.
pub async fn create_vendor(pool: &PgPool, email: &str, company: &str) -> Vendor {
    let user = create_user(pool, email, ROLE_CLIENT).await;
    VendorRepo::create(
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
    .unwrap()
}

/// A vendor approved by a freshly created admin.
pub async fn create_approved_vendor(pool: &PgPool, email: &str, company: &str) -> Vendor {
    let vendor = create_vendor(pool, email, company).await;
    let admin = create_user(pool, &format!("admin+{email}"), "admin").await;
    VendorRepo::change_status(pool, vendor.id, VendorStatus::Approved, admin.id, None)
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
