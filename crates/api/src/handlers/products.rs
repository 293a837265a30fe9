//! Handlers for the `/products` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use marketplace_core::catalog::{
    validate_name, validate_price, validate_price_range, validate_sku, validate_stock,
    ProductSort, ProductStatus,
};
use marketplace_core::csv::CsvWriter;
use marketplace_core::error::CoreError;
use marketplace_core::money::format_minor;
use marketplace_core::pagination::{Page, PageRequest};
use marketplace_core::types::{DbId, Money};
use marketplace_core::vendor::VendorStatus;
use marketplace_db::models::image::Image;
use marketplace_db::models::product::{CreateProduct, Product, ProductQuery, UpdateProduct};
use marketplace_db::repositories::{
    CategoryRepo, ImageRepo, ProductRepo, SubcategoryRepo, VendorRepo,
};
use serde::{Deserialize, Serialize};

use super::export::csv_attachment;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::non_empty;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /products` and `GET /products/export`.
#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub vendor_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub subcategory_id: Option<DbId>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductListParams {
    fn to_query(&self) -> AppResult<(ProductQuery, ProductSort)> {
        validate_price_range(self.min_price, self.max_price)?;

        let status = non_empty(&self.status);
        if let Some(s) = status.as_deref() {
            s.parse::<ProductStatus>()?;
        }
        let sort = match non_empty(&self.sort) {
            Some(s) => s.parse::<ProductSort>()?,
            None => ProductSort::Newest,
        };

        let query = ProductQuery {
            vendor_id: self.vendor_id,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            status,
            search: non_empty(&self.search),
            min_price: self.min_price,
            max_price: self.max_price,
        };
        Ok((query, sort))
    }
}

/// A product with its images, for the detail page.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<Image>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<DataResponse<Page<Product>>>> {
    let page = PageRequest::new(params.limit, params.offset);
    let (filter, sort) = params.to_query()?;

    let items = ProductRepo::list(&state.pool, &filter, sort, page).await?;
    let total = ProductRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// POST /api/products
///
/// The vendor must be approved and live; a subcategory, when given, must
/// belong to the chosen category.
pub async fn create_product(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(mut input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    validate_name(&input.name, "name")?;
    validate_sku(&input.sku)?;
    validate_price(input.price)?;
    validate_stock(input.stock)?;
    if let Some(status) = non_empty(&input.status) {
        input.status = Some(status.parse::<ProductStatus>()?.as_str().to_string());
    } else {
        input.status = None;
    }

    let vendor = VendorRepo::find_by_id(&state.pool, input.vendor_id, false)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: input.vendor_id,
        }))?;
    if !vendor.status.parse::<VendorStatus>()?.can_sell() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Vendor {} is {} and cannot list products",
            vendor.id, vendor.status
        ))));
    }

    ensure_category_pair(&state, input.category_id, input.subcategory_id).await?;

    input.name = input.name.trim().to_string();
    input.sku = input.sku.trim().to_string();

    let product = ProductRepo::create(&state.pool, &input).await?;
    tracing::info!(
        product_id = product.id,
        vendor_id = product.vendor_id,
        sku = %product.sku,
        created_by = staff.user_id,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProductDetail>>> {
    let product = find_product(&state, id).await?;
    let images = ImageRepo::list_by_product(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: ProductDetail { product, images },
    }))
}

/// PUT /api/products/{id}
///
/// A product moved to another category keeps its current subcategory unless
/// a new one is named, and whichever applies must belong to the new category.
pub async fn update_product(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name, "name")?;
    }
    if let Some(sku) = input.sku.as_deref() {
        validate_sku(sku)?;
    }
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    if let Some(stock) = input.stock {
        validate_stock(stock)?;
    }
    if let Some(status) = input.status.as_deref() {
        input.status = Some(status.trim().parse::<ProductStatus>()?.as_str().to_string());
    }

    let current = find_product(&state, id).await?;
    if input.category_id.is_some() || input.subcategory_id.is_some() {
        let category_id = input.category_id.unwrap_or(current.category_id);
        let subcategory_id = input.subcategory_id.or(current.subcategory_id);
        ensure_category_pair(&state, category_id, subcategory_id).await?;
    }

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Product", id }))?;

    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/products/{id}
///
/// Soft delete; the product is archived and hidden from lists.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProductRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(product_id = id, deleted_by = admin.user_id, "Product soft-deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Product", id }))
    }
}

/// GET /api/products/export
pub async fn export_products(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<ProductListParams>,
) -> AppResult<Response> {
    let (filter, sort) = params.to_query()?;
    let products = ProductRepo::list_all(&state.pool, &filter, sort).await?;

    let mut csv = CsvWriter::new(&[
        "id",
        "sku",
        "name",
        "vendor",
        "category",
        "price",
        "stock",
        "status",
        "created_at",
    ]);
    for p in &products {
        csv.row([
            p.id.to_string(),
            p.sku.clone(),
            p.name.clone(),
            p.vendor_name.clone(),
            p.category_name.clone(),
            format_minor(p.price),
            p.stock.to_string(),
            p.status.clone(),
            p.created_at.to_rfc3339(),
        ]);
    }

    Ok(csv_attachment("products", csv.finish()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_product(state: &AppState, id: DbId) -> AppResult<Product> {
    ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Product", id }))
}

/// The category must exist and the subcategory, if any, must sit under it.
async fn ensure_category_pair(
    state: &AppState,
    category_id: DbId,
    subcategory_id: Option<DbId>,
) -> AppResult<()> {
    CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    if let Some(sub_id) = subcategory_id {
        if SubcategoryRepo::find(&state.pool, category_id, sub_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Subcategory {sub_id} does not belong to category {category_id}"
            ))));
        }
    }
    Ok(())
}
