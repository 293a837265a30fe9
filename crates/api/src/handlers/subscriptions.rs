//! Handlers for `/subscriptions`: plan management and vendor subscriptions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use marketplace_core::catalog::{validate_name, validate_price};
use marketplace_core::error::CoreError;
use marketplace_core::pagination::{Page, PageRequest};
use marketplace_core::subscription::{validate_product_limit, BillingCycle, SubscriptionStatus};
use marketplace_core::types::DbId;
use marketplace_core::vendor::VendorStatus;
use marketplace_db::models::subscription::{
    CreatePlan, CreateSubscription, Subscription, SubscriptionPlan, SubscriptionQuery, UpdatePlan,
};
use marketplace_db::repositories::{SubscriptionPlanRepo, SubscriptionRepo, VendorRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::{non_empty, IncludeInactiveParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /subscriptions`.
#[derive(Debug, Deserialize)]
pub struct SubscriptionListParams {
    pub vendor_id: Option<DbId>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// GET /api/subscriptions/plans
pub async fn list_plans(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<SubscriptionPlan>>>> {
    let plans = SubscriptionPlanRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// POST /api/subscriptions/plans
pub async fn create_plan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(mut input): Json<CreatePlan>,
) -> AppResult<(StatusCode, Json<DataResponse<SubscriptionPlan>>)> {
    validate_name(&input.name, "name")?;
    validate_price(input.price)?;
    validate_product_limit(input.product_limit)?;
    input.billing_cycle = input
        .billing_cycle
        .trim()
        .parse::<BillingCycle>()?
        .as_str()
        .to_string();
    input.name = input.name.trim().to_string();

    let plan = SubscriptionPlanRepo::create(&state.pool, &input).await?;
    tracing::info!(
        plan_id = plan.id,
        price = plan.price,
        created_by = admin.user_id,
        "Plan created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: plan })))
}

/// PUT /api/subscriptions/plans/{id}
///
/// Price changes apply to future subscriptions only.
pub async fn update_plan(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdatePlan>,
) -> AppResult<Json<DataResponse<SubscriptionPlan>>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name, "name")?;
    }
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    validate_product_limit(input.product_limit)?;
    if let Some(cycle) = input.billing_cycle.as_deref() {
        input.billing_cycle = Some(cycle.trim().parse::<BillingCycle>()?.as_str().to_string());
    }

    let plan = SubscriptionPlanRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SubscriptionPlan",
            id,
        }))?;

    Ok(Json(DataResponse { data: plan }))
}

/// DELETE /api/subscriptions/plans/{id}
///
/// Deactivates the plan. Existing subscriptions run to the end of their period.
pub async fn delete_plan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SubscriptionPlanRepo::deactivate(&state.pool, id).await? {
        tracing::info!(plan_id = id, deactivated_by = admin.user_id, "Plan deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "SubscriptionPlan",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

/// GET /api/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<SubscriptionListParams>,
) -> AppResult<Json<DataResponse<Page<Subscription>>>> {
    let page = PageRequest::new(params.limit, params.offset);
    let status = non_empty(&params.status);
    if let Some(s) = status.as_deref() {
        s.parse::<SubscriptionStatus>()?;
    }
    let filter = SubscriptionQuery {
        vendor_id: params.vendor_id,
        status,
    };

    let items = SubscriptionRepo::list(&state.pool, &filter, page).await?;
    let total = SubscriptionRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// POST /api/subscriptions
///
/// Starts a subscription for an approved vendor. With `pay_from_wallet` the
/// plan price is debited from the vendor's wallet in the same transaction.
pub async fn create_subscription(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(input): Json<CreateSubscription>,
) -> AppResult<(StatusCode, Json<DataResponse<Subscription>>)> {
    let vendor = VendorRepo::find_by_id(&state.pool, input.vendor_id, false)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: input.vendor_id,
        }))?;
    if !vendor.status.parse::<VendorStatus>()?.can_sell() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Vendor {} is {} and cannot subscribe",
            vendor.id, vendor.status
        ))));
    }

    let subscription = SubscriptionRepo::create(&state.pool, &input).await?;
    tracing::info!(
        subscription_id = subscription.id,
        vendor_id = subscription.vendor_id,
        plan_id = subscription.plan_id,
        paid_from_wallet = subscription.transaction_id.is_some(),
        created_by = staff.user_id,
        "Subscription started"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: subscription })))
}

/// GET /api/subscriptions/{id}
pub async fn get_subscription(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Subscription>>> {
    let subscription = SubscriptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscription",
            id,
        }))?;

    Ok(Json(DataResponse { data: subscription }))
}

/// POST /api/subscriptions/{id}/cancel
///
/// No refund is issued for the unused part of the period.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Subscription>>> {
    let subscription = SubscriptionRepo::cancel(&state.pool, id).await?;
    tracing::info!(subscription_id = id, cancelled_by = staff.user_id, "Subscription cancelled");
    Ok(Json(DataResponse { data: subscription }))
}
