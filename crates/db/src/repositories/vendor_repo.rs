//! Repository for the `vendors` table.

use marketplace_core::error::CoreError;
use marketplace_core::pagination::PageRequest;
use marketplace_core::roles::ROLE_VENDOR;
use marketplace_core::types::DbId;
use marketplace_core::vendor::VendorStatus;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::filter::Filter;
use crate::models::vendor::{CreateVendor, UpdateVendor, Vendor, VendorQuery};
use crate::repositories::UserRepo;

const SELECT: &str = "SELECT v.id, v.user_id, u.email, v.vendor_type, v.display_name, \
                      v.first_name, v.last_name, v.national_id, v.company_name, \
                      v.registration_number, v.tax_id, v.address, v.status, \
                      v.rejection_reason, v.approved_at, v.approved_by, v.deleted_at, \
                      v.created_at, v.updated_at \
                      FROM vendors v JOIN users u ON u.id = v.user_id";

/// Provides CRUD, approval workflow, and soft delete for vendors.
pub struct VendorRepo;

impl VendorRepo {
    /// Insert a vendor and promote its user to the vendor role, atomically.
    pub async fn create(pool: &PgPool, input: &CreateVendor) -> Result<Vendor, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO vendors (user_id, vendor_type, display_name, first_name, last_name,
                                  national_id, company_name, registration_number, tax_id, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(&input.vendor_type)
        .bind(&input.display_name)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.national_id)
        .bind(&input.company_name)
        .bind(&input.registration_number)
        .bind(&input.tax_id)
        .bind(&input.address)
        .fetch_one(&mut *tx)
        .await?;

        UserRepo::set_role(&mut tx, input.user_id, ROLE_VENDOR).await?;

        let vendor = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(vendor)
    }

    /// Find a vendor by ID. Soft-deleted vendors are only returned when
    /// `include_deleted` is set.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        include_deleted: bool,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = if include_deleted {
            format!("{SELECT} WHERE v.id = $1")
        } else {
            format!("{SELECT} WHERE v.id = $1 AND v.deleted_at IS NULL")
        };
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the live vendor owned by a user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!("{SELECT} WHERE v.user_id = $1 AND v.deleted_at IS NULL");
        sqlx::query_as::<_, Vendor>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of vendors, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &VendorQuery,
        page: PageRequest,
    ) -> Result<Vec<Vendor>, sqlx::Error> {
        let filter = build_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "{SELECT} {} ORDER BY v.created_at DESC, v.id DESC LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Vendor>(&query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    /// Every vendor matching the filter, for export.
    pub async fn list_all(pool: &PgPool, params: &VendorQuery) -> Result<Vec<Vendor>, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!("{SELECT} {} ORDER BY v.id", filter.where_clause());
        filter
            .bind_as(sqlx::query_as::<_, Vendor>(&query))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &VendorQuery) -> Result<i64, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!(
            "SELECT COUNT(*) FROM vendors v JOIN users u ON u.id = v.user_id {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update profile fields of a live vendor. `display_name` is supplied by
    /// the caller after recomputing it from the merged fields.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVendor,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            "UPDATE vendors SET
                display_name = COALESCE($2, display_name),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                national_id = COALESCE($5, national_id),
                company_name = COALESCE($6, company_name),
                registration_number = COALESCE($7, registration_number),
                tax_id = COALESCE($8, tax_id),
                address = COALESCE($9, address)
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(&input.display_name)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.national_id)
        .bind(&input.company_name)
        .bind(&input.registration_number)
        .bind(&input.tax_id)
        .bind(&input.address)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        let vendor = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(Some(vendor))
    }

    /// Move a live vendor through the approval workflow.
    ///
    /// The current status is read under a row lock so two reviewers cannot
    /// race each other. `reason` is stored for rejections and suspensions
    /// and cleared on approval.
    pub async fn change_status(
        pool: &PgPool,
        id: DbId,
        next: VendorStatus,
        actor_id: DbId,
        reason: Option<&str>,
    ) -> Result<Vendor, DbError> {
        let mut tx = pool.begin().await?;

        let current: String = sqlx::query_scalar(
            "SELECT status FROM vendors WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::NotFound { entity: "Vendor", id })?;

        let next = current.parse::<VendorStatus>()?.transition(next)?;
        let approved = next == VendorStatus::Approved;

        sqlx::query(
            "UPDATE vendors SET
                status = $2,
                rejection_reason = $3,
                approved_at = CASE WHEN $4 THEN NOW() ELSE approved_at END,
                approved_by = CASE WHEN $4 THEN $5 ELSE approved_by END
             WHERE id = $1",
        )
        .bind(id)
        .bind(next.as_str())
        .bind(if approved { None } else { reason })
        .bind(approved)
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;

        let vendor = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(vendor)
    }

    /// Soft-delete a vendor by setting `deleted_at`. Returns `true` if the row
    /// was live.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE vendors SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear `deleted_at`. Returns `true` if the vendor was deleted.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE vendors SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn fetch(conn: &mut PgConnection, id: DbId) -> Result<Vendor, sqlx::Error> {
    let query = format!("{SELECT} WHERE v.id = $1");
    sqlx::query_as::<_, Vendor>(&query)
        .bind(id)
        .fetch_one(conn)
        .await
}

fn build_filter(params: &VendorQuery) -> Filter {
    let mut filter = Filter::new();
    if !params.include_deleted {
        filter.push_raw("v.deleted_at IS NULL");
    }
    filter
        .eq_text("v.status", params.status.as_deref())
        .eq_text("v.vendor_type", params.vendor_type.as_deref())
        .search(
            &["v.display_name", "v.company_name", "u.email"],
            params.search.as_deref(),
        );
    filter
}
