//! Handlers for the `/category` resource and its subcategories.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use marketplace_core::catalog::{slugify, validate_name};
use marketplace_core::error::CoreError;
use marketplace_core::types::DbId;
use marketplace_db::models::category::{
    Category, CategorySummary, CreateCategory, Subcategory, UpdateCategory, UpdateSubcategory,
};
use marketplace_db::repositories::{CategoryRepo, SubcategoryRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /category`.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

/// Request body for `PUT /category/{id}`. A new name re-derives the slug.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /category/{id}/subcategories`.
#[derive(Debug, Deserialize)]
pub struct CreateSubcategoryRequest {
    pub name: String,
}

/// Request body for `PUT /category/{id}/subcategories/{sub_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateSubcategoryRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// A category with its subcategories, for the detail page.
#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/category
///
/// Active categories by default; `?include_inactive=true` lists all.
pub async fn list_categories(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<CategorySummary>>>> {
    let categories = CategoryRepo::list(&state.pool, !params.include_inactive).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/category
///
/// The slug is derived from the name; a duplicate slug is a 409.
pub async fn create_category(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    validate_name(&input.name, "name")?;
    let slug = slugify(&input.name)?;

    let create_dto = CreateCategory {
        name: input.name.trim().to_string(),
        slug,
        description: input.description,
        image_path: input.image_path,
    };
    let category = CategoryRepo::create(&state.pool, &create_dto).await?;

    tracing::info!(
        category_id = category.id,
        slug = %category.slug,
        created_by = staff.user_id,
        "Category created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/category/{id}
pub async fn get_category(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CategoryDetail>>> {
    let category = find_category(&state, id).await?;
    let subcategories = SubcategoryRepo::list_by_category(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: CategoryDetail {
            category,
            subcategories,
        },
    }))
}

/// PUT /api/category/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategoryRequest>,
) -> AppResult<Json<DataResponse<Category>>> {
    let (name, slug) = match input.name.as_deref() {
        Some(name) => {
            validate_name(name, "name")?;
            (Some(name.trim().to_string()), Some(slugify(name)?))
        }
        None => (None, None),
    };

    let update_dto = UpdateCategory {
        name,
        slug,
        description: input.description,
        image_path: input.image_path,
        is_active: input.is_active,
    };

    let category = CategoryRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Category", id }))?;

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/category/{id}
///
/// Refused with 409 while live products are filed under the category.
/// Soft-deleted products do not block it.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CategoryRepo::delete(&state.pool, id).await? {
        tracing::info!(category_id = id, deleted_by = admin.user_id, "Category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Category", id }))
    }
}

// ---------------------------------------------------------------------------
// Subcategories
// ---------------------------------------------------------------------------

/// GET /api/category/{id}/subcategories
pub async fn list_subcategories(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Subcategory>>>> {
    find_category(&state, id).await?;
    let subcategories = SubcategoryRepo::list_by_category(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: subcategories,
    }))
}

/// POST /api/category/{id}/subcategories
pub async fn create_subcategory(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<CreateSubcategoryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Subcategory>>)> {
    validate_name(&input.name, "name")?;
    let slug = slugify(&input.name)?;
    find_category(&state, id).await?;

    let subcategory = SubcategoryRepo::create(&state.pool, id, input.name.trim(), &slug).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: subcategory })))
}

/// PUT /api/category/{id}/subcategories/{sub_id}
pub async fn update_subcategory(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((id, sub_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSubcategoryRequest>,
) -> AppResult<Json<DataResponse<Subcategory>>> {
    let (name, slug) = match input.name.as_deref() {
        Some(name) => {
            validate_name(name, "name")?;
            (Some(name.trim().to_string()), Some(slugify(name)?))
        }
        None => (None, None),
    };

    let update_dto = UpdateSubcategory {
        name,
        slug,
        is_active: input.is_active,
    };

    let subcategory = SubcategoryRepo::update(&state.pool, id, sub_id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subcategory",
            id: sub_id,
        }))?;

    Ok(Json(DataResponse { data: subcategory }))
}

/// DELETE /api/category/{id}/subcategories/{sub_id}
///
/// Products filed under the subcategory keep their category and lose the
/// subcategory link.
pub async fn delete_subcategory(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((id, sub_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if SubcategoryRepo::delete(&state.pool, id, sub_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Subcategory",
            id: sub_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_category(state: &AppState, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Category", id }))
}
