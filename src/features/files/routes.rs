use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers;
use crate::features::files::services::FileService;
use crate::shared::constants::FILE_UNAVAILABLE_ROUTE;

/// Headroom for multipart boundaries and part headers
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Protected file routes (require JWT authentication)
pub fn routes(file_service: Arc<FileService>) -> Router {
    let body_limit = file_service.max_upload_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/api/files", get(handlers::list_files))
        .route(
            "/api/files/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/files/{id}", delete(handlers::delete_file))
        .route("/api/files/{id}/link", get(handlers::get_share_link))
        .route(
            "/api/files/uploads/{upload_id}",
            get(handlers::get_upload_progress),
        )
        .with_state(file_service)
}

/// Public share routes
pub fn public_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/share/{id}", get(handlers::open_shared_file))
        .route(FILE_UNAVAILABLE_ROUTE, get(handlers::file_not_available))
        .with_state(file_service)
}
