//! Handler for the dashboard landing page.

use axum::extract::State;
use axum::Json;
use marketplace_db::models::dashboard::DashboardSummary;
use marketplace_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/dashboard/summary
///
/// Vendor and order counts by status, live product and client counts,
/// delivered revenue, and the total held in wallets.
pub async fn summary(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let summary = DashboardRepo::summary(&state.pool).await?;
    Ok(Json(DataResponse { data: summary }))
}
