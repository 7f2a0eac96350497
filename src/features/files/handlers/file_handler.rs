use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::UploadId;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DeleteFileResponseDto, FileResponseDto, ListFilesQuery, ShareLinkDto, UploadFileDto,
    UploadProgressDto, UploadResultDto,
};
use crate::features::files::services::{FileService, UploadBlob};
use crate::shared::constants::DEFAULT_CONTENT_TYPE;
use crate::shared::types::{ApiResponse, Meta};

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` field. Send an
/// `X-Upload-Id` header to poll progress while the request runs.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    params(
        ("x-upload-id" = Option<String>, Header, description = "Client chosen id for progress polling")
    ),
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form",
    ),
    responses(
        (status = 201, description = "File saved, see `tier` and `notice`", body = ApiResponse<UploadResultDto>),
        (status = 400, description = "Missing, empty or unnamed file"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large"),
        (status = 502, description = "No storage tier could keep the file")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    UploadId(upload_id): UploadId,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResultDto>>)> {
    let mut blob: Option<UploadBlob> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field: {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let name = field.file_name().map(|s| s.to_string()).unwrap_or_default();

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        blob = Some(UploadBlob {
            name,
            content_type,
            data: data.to_vec(),
        });
    }

    let blob = blob.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let on_progress = upload_id
        .as_deref()
        .map(|id| service.progress_tracker().callback_for(id, user.owner_id()));

    let outcome = service.save(blob, user.owner_id(), on_progress).await?;
    let tier = outcome.file.tier();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(UploadResultDto {
                file: FileResponseDto::from(outcome.file),
                tier,
                notice: outcome.notice.clone(),
            }),
            outcome.notice,
            None,
        )),
    ))
}

/// List the caller's files in upload order
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Files of the caller", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let files: Vec<FileResponseDto> = service
        .list(user.owner_id(), query.search.as_deref(), query.category)
        .await?
        .into_iter()
        .map(FileResponseDto::from)
        .collect();

    let total = files.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Delete one of the caller's files
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>> {
    service.delete(user.owner_id(), &id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

/// Get a shareable link for one of the caller's files
#[utoipa::path(
    get,
    path = "/api/files/{id}/link",
    tag = "files",
    params(
        ("id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "Share link", body = ApiResponse<ShareLinkDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_share_link(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ShareLinkDto>>> {
    let (file, link) = service.link_for(user.owner_id(), &id).await?;

    Ok(Json(ApiResponse::success(
        Some(ShareLinkDto {
            share_url: service.share_url(&file.id),
            file_id: file.id,
            url: link.url().to_string(),
            available: link.is_available(),
        }),
        None,
        None,
    )))
}

/// Latest progress of an upload started with `X-Upload-Id`
#[utoipa::path(
    get,
    path = "/api/files/uploads/{upload_id}",
    tag = "files",
    params(
        ("upload_id" = String, Path, description = "Value sent in X-Upload-Id")
    ),
    responses(
        (status = 200, description = "Upload progress", body = ApiResponse<UploadProgressDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Unknown upload")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_upload_progress(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(upload_id): Path<String>,
) -> Result<Json<ApiResponse<UploadProgressDto>>> {
    let progress = service
        .progress_tracker()
        .get(&upload_id, user.owner_id())
        .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", upload_id)))?;

    Ok(Json(ApiResponse::success(
        Some(UploadProgressDto::new(upload_id, progress)),
        None,
        None,
    )))
}
