//! Handlers for the `/vendors` resource.
//!
//! Covers registration of individual and business vendors, the approval
//! workflow, soft delete, internal notes, payout methods, and the CSV report.
//! Reads and edits need `staff`; approval decisions and deletes need `admin`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use marketplace_core::csv::{opt, CsvWriter};
use marketplace_core::error::CoreError;
use marketplace_core::pagination::{Page, PageRequest};
use marketplace_core::roles::is_staff;
use marketplace_core::types::DbId;
use marketplace_core::vendor::{
    display_name, validate_business, validate_individual, validate_note_body,
    validate_rejection_reason, BusinessFields, IndividualFields, PaymentMethodType, VendorStatus,
    VendorType,
};
use marketplace_db::models::vendor::{
    CreatePaymentMethod, CreateVendor, PaymentMethod, UpdateVendor, Vendor, VendorNote,
    VendorQuery,
};
use marketplace_db::repositories::{PaymentMethodRepo, UserRepo, VendorNoteRepo, VendorRepo};
use serde::Deserialize;

use super::export::csv_attachment;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::non_empty;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /vendors` and `GET /vendors/export`.
#[derive(Debug, Deserialize)]
pub struct VendorListParams {
    pub status: Option<String>,
    pub vendor_type: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl VendorListParams {
    fn to_query(&self) -> AppResult<VendorQuery> {
        let status = non_empty(&self.status);
        if let Some(s) = status.as_deref() {
            s.parse::<VendorStatus>()?;
        }
        let vendor_type = non_empty(&self.vendor_type);
        if let Some(t) = vendor_type.as_deref() {
            t.parse::<VendorType>()?;
        }
        Ok(VendorQuery {
            status,
            vendor_type,
            search: non_empty(&self.search),
            include_deleted: self.include_deleted,
        })
    }
}

/// Request body for `POST /vendors/individual`.
#[derive(Debug, Deserialize)]
pub struct CreateIndividualVendorRequest {
    pub user_id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// Request body for `POST /vendors/business`.
#[derive(Debug, Deserialize)]
pub struct CreateBusinessVendorRequest {
    pub user_id: DbId,
    pub company_name: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// Request body for `POST /vendors/{id}/reject` and `/suspend`.
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    pub reason: Option<String>,
}

/// Request body for `POST /vendors/{id}/notes`.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub body: String,
}

/// Request body for `POST /vendors/{id}/payment-methods`.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentMethodRequest {
    pub method_type: String,
    pub account_name: String,
    pub account_number: String,
    pub provider: Option<String>,
}

// ---------------------------------------------------------------------------
// Vendor CRUD
// ---------------------------------------------------------------------------

/// GET /api/vendors
pub async fn list_vendors(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<VendorListParams>,
) -> AppResult<Json<DataResponse<Page<Vendor>>>> {
    let page = PageRequest::new(params.limit, params.offset);
    let filter = params.to_query()?;

    let items = VendorRepo::list(&state.pool, &filter, page).await?;
    let total = VendorRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// POST /api/vendors/individual
///
/// Register an individual vendor. The vendor starts `pending` and the linked
/// user is moved to the `vendor` role.
pub async fn create_individual_vendor(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(input): Json<CreateIndividualVendorRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Vendor>>)> {
    let individual = IndividualFields {
        first_name: input.first_name.as_deref(),
        last_name: input.last_name.as_deref(),
        national_id: input.national_id.as_deref(),
    };
    validate_individual(&individual)?;
    ensure_vendor_candidate(&state, input.user_id).await?;

    let create_dto = CreateVendor {
        user_id: input.user_id,
        vendor_type: VendorType::Individual.as_str().to_string(),
        display_name: display_name(
            VendorType::Individual,
            &individual,
            &BusinessFields::default(),
        ),
        first_name: trimmed(input.first_name),
        last_name: trimmed(input.last_name),
        national_id: trimmed(input.national_id),
        company_name: None,
        registration_number: None,
        tax_id: trimmed(input.tax_id),
        address: trimmed(input.address),
    };

    let vendor = VendorRepo::create(&state.pool, &create_dto).await?;
    tracing::info!(
        vendor_id = vendor.id,
        user_id = vendor.user_id,
        vendor_type = %vendor.vendor_type,
        created_by = staff.user_id,
        "Vendor registered"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: vendor })))
}

/// POST /api/vendors/business
pub async fn create_business_vendor(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(input): Json<CreateBusinessVendorRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Vendor>>)> {
    let business = BusinessFields {
        company_name: input.company_name.as_deref(),
        registration_number: input.registration_number.as_deref(),
    };
    validate_business(&business)?;
    ensure_vendor_candidate(&state, input.user_id).await?;

    let create_dto = CreateVendor {
        user_id: input.user_id,
        vendor_type: VendorType::Business.as_str().to_string(),
        display_name: display_name(
            VendorType::Business,
            &IndividualFields::default(),
            &business,
        ),
        first_name: None,
        last_name: None,
        national_id: None,
        company_name: trimmed(input.company_name),
        registration_number: trimmed(input.registration_number),
        tax_id: trimmed(input.tax_id),
        address: trimmed(input.address),
    };

    let vendor = VendorRepo::create(&state.pool, &create_dto).await?;
    tracing::info!(
        vendor_id = vendor.id,
        user_id = vendor.user_id,
        vendor_type = %vendor.vendor_type,
        created_by = staff.user_id,
        "Vendor registered"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: vendor })))
}

/// GET /api/vendors/{id}
pub async fn get_vendor(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vendor>>> {
    let vendor = find_vendor(&state, id).await?;
    Ok(Json(DataResponse { data: vendor }))
}

/// PUT /api/vendors/{id}
///
/// Update profile fields. The merged record must still satisfy the rules of
/// the vendor's type, and the display name follows the names unless one is
/// given explicitly.
pub async fn update_vendor(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVendor>,
) -> AppResult<Json<DataResponse<Vendor>>> {
    let current = find_vendor(&state, id).await?;
    let vendor_type = current.vendor_type.parse::<VendorType>()?;

    let first_name = input.first_name.clone().or(current.first_name);
    let last_name = input.last_name.clone().or(current.last_name);
    let national_id = input.national_id.clone().or(current.national_id);
    let company_name = input.company_name.clone().or(current.company_name);
    let registration_number = input
        .registration_number
        .clone()
        .or(current.registration_number);

    let individual = IndividualFields {
        first_name: first_name.as_deref(),
        last_name: last_name.as_deref(),
        national_id: national_id.as_deref(),
    };
    let business = BusinessFields {
        company_name: company_name.as_deref(),
        registration_number: registration_number.as_deref(),
    };
    match vendor_type {
        VendorType::Individual => validate_individual(&individual)?,
        VendorType::Business => validate_business(&business)?,
    }

    let update_dto = UpdateVendor {
        display_name: non_empty(&input.display_name)
            .or_else(|| Some(display_name(vendor_type, &individual, &business))),
        ..input
    };

    let vendor = VendorRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Vendor", id }))?;

    Ok(Json(DataResponse { data: vendor }))
}

// ---------------------------------------------------------------------------
// Approval workflow
// ---------------------------------------------------------------------------

/// POST /api/vendors/{id}/approve
pub async fn approve_vendor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vendor>>> {
    let vendor =
        VendorRepo::change_status(&state.pool, id, VendorStatus::Approved, admin.user_id, None)
            .await?;

    tracing::info!(vendor_id = id, approved_by = admin.user_id, "Vendor approved");
    Ok(Json(DataResponse { data: vendor }))
}

/// POST /api/vendors/{id}/reject
///
/// A reason is mandatory and is shown to the vendor.
pub async fn reject_vendor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ReasonRequest>,
) -> AppResult<Json<DataResponse<Vendor>>> {
    let reason = input.reason.unwrap_or_default();
    validate_rejection_reason(&reason)?;

    let vendor = VendorRepo::change_status(
        &state.pool,
        id,
        VendorStatus::Rejected,
        admin.user_id,
        Some(reason.trim()),
    )
    .await?;

    tracing::info!(vendor_id = id, rejected_by = admin.user_id, "Vendor rejected");
    Ok(Json(DataResponse { data: vendor }))
}

/// POST /api/vendors/{id}/suspend
///
/// The body is optional; a reason, when given, is stored on the vendor.
pub async fn suspend_vendor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    input: Option<Json<ReasonRequest>>,
) -> AppResult<Json<DataResponse<Vendor>>> {
    let reason = input.and_then(|Json(body)| non_empty(&body.reason));

    let vendor = VendorRepo::change_status(
        &state.pool,
        id,
        VendorStatus::Suspended,
        admin.user_id,
        reason.as_deref(),
    )
    .await?;

    tracing::info!(vendor_id = id, suspended_by = admin.user_id, "Vendor suspended");
    Ok(Json(DataResponse { data: vendor }))
}

/// DELETE /api/vendors/{id}
///
/// Soft delete: hidden from lists and lookups, restorable.
pub async fn delete_vendor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if VendorRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(vendor_id = id, deleted_by = admin.user_id, "Vendor soft-deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Vendor", id }))
    }
}

/// POST /api/vendors/{id}/restore
pub async fn restore_vendor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vendor>>> {
    if !VendorRepo::restore(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Vendor", id }));
    }
    tracing::info!(vendor_id = id, restored_by = admin.user_id, "Vendor restored");

    let vendor = find_vendor(&state, id).await?;
    Ok(Json(DataResponse { data: vendor }))
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// GET /api/vendors/{id}/notes
pub async fn list_notes(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<VendorNote>>>> {
    find_vendor(&state, id).await?;
    let notes = VendorNoteRepo::list_by_vendor(&state.pool, id).await?;
    Ok(Json(DataResponse { data: notes }))
}

/// POST /api/vendors/{id}/notes
pub async fn create_note(
    State(state): State<AppState>,
    RequireStaff(author): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<CreateNoteRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<VendorNote>>)> {
    validate_note_body(&input.body)?;
    find_vendor(&state, id).await?;

    let note = VendorNoteRepo::create(&state.pool, id, author.user_id, input.body.trim()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// DELETE /api/vendors/{id}/notes/{note_id}
pub async fn delete_note(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((id, note_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if VendorNoteRepo::delete(&state.pool, id, note_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "VendorNote",
            id: note_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Payment methods
// ---------------------------------------------------------------------------

/// GET /api/vendors/{id}/payment-methods
///
/// The default method is listed first.
pub async fn list_payment_methods(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PaymentMethod>>>> {
    find_vendor(&state, id).await?;
    let methods = PaymentMethodRepo::list_by_vendor(&state.pool, id).await?;
    Ok(Json(DataResponse { data: methods }))
}

/// POST /api/vendors/{id}/payment-methods
///
/// The vendor's first method becomes its default.
pub async fn create_payment_method(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePaymentMethodRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PaymentMethod>>)> {
    let method_type = input.method_type.trim().parse::<PaymentMethodType>()?;
    let account_name = input.account_name.trim();
    let account_number = input.account_number.trim();
    if account_name.is_empty() || account_number.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "account_name and account_number are required".into(),
        )));
    }
    find_vendor(&state, id).await?;

    let create_dto = CreatePaymentMethod {
        method_type: method_type.as_str().to_string(),
        account_name: account_name.to_string(),
        account_number: account_number.to_string(),
        provider: trimmed(input.provider),
    };
    let method = PaymentMethodRepo::create(&state.pool, id, &create_dto).await?;

    tracing::info!(vendor_id = id, payment_method_id = method.id, "Payment method added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: method })))
}

/// PUT /api/vendors/{id}/payment-methods/{pm_id}/default
pub async fn set_default_payment_method(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((id, pm_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<PaymentMethod>>> {
    let method = PaymentMethodRepo::set_default(&state.pool, id, pm_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PaymentMethod",
            id: pm_id,
        }))?;

    Ok(Json(DataResponse { data: method }))
}

/// DELETE /api/vendors/{id}/payment-methods/{pm_id}
///
/// Removing the default promotes the oldest remaining method.
pub async fn delete_payment_method(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((id, pm_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if PaymentMethodRepo::delete(&state.pool, id, pm_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PaymentMethod",
            id: pm_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// GET /api/vendors/export
///
/// All vendors matching the list filters as a CSV attachment.
pub async fn export_vendors(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<VendorListParams>,
) -> AppResult<Response> {
    let filter = params.to_query()?;
    let vendors = VendorRepo::list_all(&state.pool, &filter).await?;

    let mut csv = CsvWriter::new(&[
        "id",
        "display_name",
        "vendor_type",
        "status",
        "email",
        "company_name",
        "registration_number",
        "tax_id",
        "address",
        "approved_at",
        "created_at",
    ]);
    for v in &vendors {
        csv.row([
            v.id.to_string(),
            v.display_name.clone(),
            v.vendor_type.clone(),
            v.status.clone(),
            v.email.clone(),
            opt(v.company_name.as_deref()),
            opt(v.registration_number.as_deref()),
            opt(v.tax_id.as_deref()),
            opt(v.address.as_deref()),
            opt(v.approved_at.map(|t| t.to_rfc3339())),
            v.created_at.to_rfc3339(),
        ]);
    }

    Ok(csv_attachment("vendors", csv.finish()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_vendor(state: &AppState, id: DbId) -> AppResult<Vendor> {
    VendorRepo::find_by_id(&state.pool, id, false)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Vendor", id }))
}

/// The user must exist and must not be back-office staff.
async fn ensure_vendor_candidate(state: &AppState, user_id: DbId) -> AppResult<()> {
    let user = UserRepo::find_response_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    if is_staff(&user.role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {user_id} is a {} account and cannot become a vendor",
            user.role
        ))));
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    non_empty(&value)
}
