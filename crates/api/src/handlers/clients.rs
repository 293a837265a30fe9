//! Handlers for the `/clients` resource (buyer profiles).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use marketplace_core::error::CoreError;
use marketplace_core::pagination::Page;
use marketplace_core::roles::ROLE_CLIENT;
use marketplace_core::types::DbId;
use marketplace_db::models::client::{Client, CreateClient, UpdateClient};
use marketplace_db::models::order::{Order, OrderQuery};
use marketplace_db::repositories::{ClientRepo, OrderRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::{non_empty, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /clients`.
#[derive(Debug, Deserialize)]
pub struct ClientListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<ClientListParams>,
) -> AppResult<Json<DataResponse<Page<Client>>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .page();
    let search = non_empty(&params.search);

    let items = ClientRepo::list(&state.pool, search.as_deref(), page).await?;
    let total = ClientRepo::count(&state.pool, search.as_deref()).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// POST /api/clients
///
/// Attach a client profile to an existing user holding the `client` role.
pub async fn create_client(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(input): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<DataResponse<Client>>)> {
    let user = UserRepo::find_response_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    if user.role != ROLE_CLIENT {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {} has role '{}'; only '{ROLE_CLIENT}' users can hold a client profile",
            user.id, user.role
        ))));
    }

    let client = ClientRepo::create(&state.pool, &input).await?;
    tracing::info!(
        client_id = client.id,
        user_id = client.user_id,
        created_by = staff.user_id,
        "Client created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: client })))
}

/// GET /api/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Client>>> {
    let client = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Client", id }))?;

    Ok(Json(DataResponse { data: client }))
}

/// PUT /api/clients/{id}
pub async fn update_client(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClient>,
) -> AppResult<Json<DataResponse<Client>>> {
    let client = ClientRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Client", id }))?;

    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/clients/{id}
///
/// Soft delete. Orders placed by the client keep referencing it.
pub async fn delete_client(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ClientRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(client_id = id, deleted_by = admin.user_id, "Client soft-deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Client", id }))
    }
}

/// GET /api/clients/{id}/orders
pub async fn list_client_orders(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Page<Order>>>> {
    ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Client", id }))?;

    let page = params.page();
    let filter = OrderQuery {
        client_id: Some(id),
        ..Default::default()
    };

    let items = OrderRepo::list(&state.pool, &filter, page).await?;
    let total = OrderRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}
