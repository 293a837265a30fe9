//! Handlers for product images (`/products/{id}/images`).
//!
//! Files are written under `<UPLOAD_DIR>/products/` with server-generated
//! names and served back at `/uploads/<file_path>`.

use std::path::Path as FsPath;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use marketplace_core::error::CoreError;
use marketplace_core::types::DbId;
use marketplace_core::upload::{
    content_type_for, stored_file_name, validate_image_name, validate_size,
};
use marketplace_db::models::image::{CreateImage, Image};
use marketplace_db::repositories::ImageRepo;

use super::products::find_product;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field name carrying image files.
const FILE_FIELD: &str = "file";

/// Subdirectory of the upload root holding product images.
const PRODUCT_IMAGE_DIR: &str = "products";

/// An image that passed validation and is ready to be stored.
struct PendingImage {
    original_name: String,
    ext: String,
    data: Bytes,
}

/// GET /api/products/{id}/images
pub async fn list_images(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(product_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Image>>>> {
    find_product(&state, product_id).await?;
    let images = ImageRepo::list_by_product(&state.pool, product_id).await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/products/{id}/images
///
/// Accepts one or more `file` fields. Every file is validated before any is
/// stored, so a bad file rejects the whole upload.
pub async fn upload_images(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(product_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Image>>>)> {
    find_product(&state, product_id).await?;

    let max_bytes = state.config.max_upload_bytes;
    let mut pending = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let ext = validate_image_name(&original_name)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        validate_size(data.len(), max_bytes)?;

        pending.push(PendingImage {
            original_name,
            ext,
            data,
        });
    }

    if pending.is_empty() {
        return Err(AppError::BadRequest(format!(
            "No '{FILE_FIELD}' fields received in multipart upload"
        )));
    }

    let dir = state.config.upload_dir.join(PRODUCT_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

    let mut written = Vec::with_capacity(pending.len());
    let mut images = Vec::with_capacity(pending.len());

    for file in pending {
        let name = stored_file_name(product_id, &file.ext);
        let dest = dir.join(&name);

        let stored = async {
            tokio::fs::write(&dest, &file.data)
                .await
                .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;
            written.push(dest.clone());

            let create_dto = CreateImage {
                product_id,
                file_path: format!("{PRODUCT_IMAGE_DIR}/{name}"),
                original_name: file.original_name.clone(),
                content_type: content_type_for(&file.ext).to_string(),
                size_bytes: file.data.len() as i64,
            };
            ImageRepo::create(&state.pool, &create_dto)
                .await
                .map_err(AppError::from)
        }
        .await;

        match stored {
            Ok(image) => images.push(image),
            Err(err) => {
                // Undo the part of the batch that already landed.
                for image in &images {
                    if let Err(e) = ImageRepo::delete(&state.pool, product_id, image.id).await {
                        tracing::warn!(
                            image_id = image.id,
                            error = %e,
                            "Failed to roll back image row"
                        );
                    }
                }
                for path in &written {
                    remove_file_best_effort(path).await;
                }
                return Err(err);
            }
        }
    }

    tracing::info!(
        product_id,
        count = images.len(),
        uploaded_by = staff.user_id,
        "Product images uploaded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: images })))
}

/// DELETE /api/products/{id}/images/{image_id}
///
/// Removes the row, then the file. A missing file is logged, not an error.
pub async fn delete_image(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((product_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let image = ImageRepo::delete(&state.pool, product_id, image_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Image",
            id: image_id,
        }))?;

    remove_file_best_effort(&state.config.upload_dir.join(&image.file_path)).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_file_best_effort(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove uploaded file");
    }
}
