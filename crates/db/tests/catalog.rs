//! Categories, subcategories, products, and images.

mod common;

use assert_matches::assert_matches;
use marketplace_core::catalog::ProductSort;
use marketplace_core::error::CoreError;
use marketplace_core::pagination::PageRequest;
use marketplace_db::error::DbError;
use marketplace_db::models::category::UpdateSubcategory;
use marketplace_db::models::image::CreateImage;
use marketplace_db::models::product::{ProductQuery, UpdateProduct};
use marketplace_db::repositories::{
    CategoryRepo, DashboardRepo, ImageRepo, ProductRepo, SubcategoryRepo,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_category_slug_violates_constraint(pool: PgPool) {
    common::create_category(&pool, "Garden", "garden").await;
    let err = CategoryRepo::create(
        &pool,
        &marketplace_db::models::category::CreateCategory {
            name: "Garden!".to_string(),
            slug: "garden".to_string(),
            description: None,
            image_path: None,
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_categories_slug"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subcategories_are_scoped_to_their_category(pool: PgPool) {
    let home = common::create_category(&pool, "Home", "home").await;
    let toys = common::create_category(&pool, "Toys", "toys").await;
    let lamps = SubcategoryRepo::create(&pool, home.id, "Lamps", "lamps").await.unwrap();

    assert!(SubcategoryRepo::find(&pool, toys.id, lamps.id).await.unwrap().is_none());
    let renamed = SubcategoryRepo::update(
        &pool,
        home.id,
        lamps.id,
        &UpdateSubcategory {
            name: Some("Lighting".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.name, "Lighting");
    assert_eq!(renamed.slug, "lamps");

    let summaries = CategoryRepo::list(&pool, false).await.unwrap();
    let home_summary = summaries.iter().find(|c| c.id == home.id).unwrap();
    assert_eq!(home_summary.subcategory_count, 1);

    assert!(!SubcategoryRepo::delete(&pool, toys.id, lamps.id).await.unwrap());
    assert!(SubcategoryRepo::delete(&pool, home.id, lamps.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_product_filters_and_sorting(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "shop@example.com", "Shop").await;
    let home = common::create_category(&pool, "Home", "home").await;
    let toys = common::create_category(&pool, "Toys", "toys").await;
    common::create_product(&pool, vendor.id, home.id, "A-1", 500, 1).await;
    common::create_product(&pool, vendor.id, home.id, "B-2", 1_500, 1).await;
    common::create_product(&pool, vendor.id, toys.id, "C-3", 2_500, 1).await;

    let page = PageRequest::new(None, None);
    let all = ProductRepo::list(&pool, &ProductQuery::default(), ProductSort::PriceDesc, page)
        .await
        .unwrap();
    assert_eq!(
        all.iter().map(|p| p.price).collect::<Vec<_>>(),
        [2_500, 1_500, 500]
    );
    assert_eq!(all[0].category_name, "Toys");
    assert_eq!(all[0].vendor_name, "Shop");

    let in_home = ProductQuery {
        category_id: Some(home.id),
        ..Default::default()
    };
    assert_eq!(ProductRepo::count(&pool, &in_home).await.unwrap(), 2);

    let mid_range = ProductQuery {
        min_price: Some(1_000),
        max_price: Some(2_000),
        ..Default::default()
    };
    let rows = ProductRepo::list(&pool, &mid_range, ProductSort::Newest, page)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sku, "B-2");

    let search = ProductQuery {
        search: Some("c-3".to_string()),
        ..Default::default()
    };
    assert_eq!(ProductRepo::count(&pool, &search).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_product_soft_delete_and_category_count(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "shop@example.com", "Shop").await;
    let home = common::create_category(&pool, "Home", "home").await;
    let lamp = common::create_product(&pool, vendor.id, home.id, "LAMP", 500, 1).await;

    assert_eq!(CategoryRepo::product_count(&pool, home.id).await.unwrap(), 1);

    let updated = ProductRepo::update(
        &pool,
        lamp.id,
        &UpdateProduct {
            price: Some(750),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.price, 750);
    assert_eq!(updated.stock, 1);

    assert!(ProductRepo::soft_delete(&pool, lamp.id).await.unwrap());
    assert!(ProductRepo::find_by_id(&pool, lamp.id).await.unwrap().is_none());
    assert!(ProductRepo::update(&pool, lamp.id, &UpdateProduct::default())
        .await
        .unwrap()
        .is_none());
    assert_eq!(CategoryRepo::product_count(&pool, home.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_category_delete_detaches_soft_deleted_products(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "shop@example.com", "Shop").await;
    let home = common::create_category(&pool, "Home", "home").await;
    let lamp = common::create_product(&pool, vendor.id, home.id, "LAMP", 500, 1).await;
    let rug = common::create_product(&pool, vendor.id, home.id, "RUG", 900, 1).await;

    let err = CategoryRepo::delete(&pool, home.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));

    assert!(ProductRepo::soft_delete(&pool, lamp.id).await.unwrap());
    let err = CategoryRepo::delete(&pool, home.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));

    assert!(ProductRepo::soft_delete(&pool, rug.id).await.unwrap());
    assert!(CategoryRepo::delete(&pool, home.id).await.unwrap());
    assert!(CategoryRepo::find_by_id(&pool, home.id).await.unwrap().is_none());

    let category_ids: Vec<Option<i64>> =
        sqlx::query_scalar("SELECT category_id FROM products ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(category_ids, vec![None, None]);

    assert!(!CategoryRepo::delete(&pool, home.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_live_product_must_keep_a_category(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "shop@example.com", "Shop").await;
    let home = common::create_category(&pool, "Home", "home").await;
    let lamp = common::create_product(&pool, vendor.id, home.id, "LAMP", 500, 1).await;

    let err = sqlx::query("UPDATE products SET category_id = NULL WHERE id = $1")
        .bind(lamp.id)
        .execute(&pool)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("ck_products_live_category"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_images_are_appended_in_order(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "shop@example.com", "Shop").await;
    let home = common::create_category(&pool, "Home", "home").await;
    let lamp = common::create_product(&pool, vendor.id, home.id, "LAMP", 500, 1).await;

    for name in ["front.jpg", "back.png"] {
        ImageRepo::create(
            &pool,
            &CreateImage {
                product_id: lamp.id,
                file_path: format!("products/{name}"),
                original_name: name.to_string(),
                content_type: "image/jpeg".to_string(),
                size_bytes: 1_024,
            },
        )
        .await
        .unwrap();
    }

    let images = ImageRepo::list_by_product(&pool, lamp.id).await.unwrap();
    assert_eq!(
        images.iter().map(|i| i.sort_order).collect::<Vec<_>>(),
        [0, 1]
    );

    let removed = ImageRepo::delete(&pool, lamp.id, images[0].id).await.unwrap();
    assert_eq!(removed.unwrap().original_name, "front.jpg");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboard_summary_on_fresh_database(pool: PgPool) {
    let vendor = common::create_approved_vendor(&pool, "shop@example.com", "Shop").await;
    common::create_vendor(&pool, "wait@example.com", "Waiting").await;
    let home = common::create_category(&pool, "Home", "home").await;
    common::create_product(&pool, vendor.id, home.id, "LAMP", 500, 1).await;

    let summary = DashboardRepo::summary(&pool).await.unwrap();
    assert_eq!(summary.active_products, 1);
    assert_eq!(summary.revenue, 0);
    assert_eq!(summary.wallet_float, 0);
    let approved = summary
        .vendors_by_status
        .iter()
        .find(|s| s.status == "approved")
        .unwrap();
    assert_eq!(approved.count, 1);
}
