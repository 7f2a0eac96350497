use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::services::{FileService, ShareLink};
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, FILE_UNAVAILABLE_ROUTE};
use crate::shared::data_url;

/// Open a shared file
///
/// Remote files redirect to their public URL, local files are served
/// directly. Anything unresolvable redirects to `/file-not-available`.
#[utoipa::path(
    get,
    path = "/share/{id}",
    tag = "share",
    params(
        ("id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File content (local files)"),
        (status = 307, description = "Redirect to the public URL or to /file-not-available")
    )
)]
pub async fn open_shared_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let Some((file, link)) = service.resolve_shared(&id).await? else {
        debug!("Shared file {} not found", id);
        return Ok(Redirect::temporary(FILE_UNAVAILABLE_ROUTE).into_response());
    };

    match link {
        ShareLink::Remote(url) => Ok(Redirect::temporary(&url).into_response()),
        ShareLink::Local(url) => match data_url::decode(&url) {
            Ok(decoded) => {
                let content_type = HeaderValue::from_str(&decoded.content_type)
                    .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
                let disposition =
                    HeaderValue::from_str(&format!("inline; filename=\"{}\"", header_safe(&file.name)))
                        .unwrap_or(HeaderValue::from_static("inline"));

                Ok((
                    [
                        (header::CONTENT_TYPE, content_type),
                        (header::CONTENT_DISPOSITION, disposition),
                    ],
                    decoded.data,
                )
                    .into_response())
            }
            Err(e) => {
                warn!("Stored local copy of {} is unreadable: {}", file.id, e);
                Ok(Redirect::temporary(FILE_UNAVAILABLE_ROUTE).into_response())
            }
        },
        ShareLink::Unavailable => Ok(Redirect::temporary(FILE_UNAVAILABLE_ROUTE).into_response()),
    }
}

/// Target of share links that cannot be resolved
#[utoipa::path(
    get,
    path = "/file-not-available",
    tag = "share",
    responses(
        (status = 404, description = "The file is not available")
    )
)]
pub async fn file_not_available() -> AppError {
    AppError::NotFound("File not available".to_string())
}

/// File name usable inside a quoted header parameter
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UploadConfig;
    use crate::features::files::registry::InMemoryFileRegistry;
    use crate::features::files::routes;
    use crate::features::files::services::UploadBlob;
    use crate::shared::test_helpers::InMemoryObjectStore;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn setup(store: InMemoryObjectStore) -> (TestServer, Arc<FileService>) {
        let service = Arc::new(FileService::new(
            Arc::new(store),
            Arc::new(InMemoryFileRegistry::new()),
            UploadConfig {
                max_upload_size: 1024,
                max_inline_size: 4096,
            },
            "http://localhost:3000".to_string(),
        ));
        let app = routes::public_routes(Arc::clone(&service));
        (TestServer::new(app).unwrap(), service)
    }

    fn blob(name: &str) -> UploadBlob {
        UploadBlob {
            name: name.to_string(),
            content_type: "text/plain".to_string(),
            data: b"shared content".to_vec(),
        }
    }

    #[test]
    fn test_header_safe() {
        assert_eq!(header_safe("report.pdf"), "report.pdf");
        assert_eq!(header_safe("a\"b\\c.txt"), "a_b_c.txt");
        assert_eq!(header_safe("café.txt"), "caf_.txt");
    }

    #[tokio::test]
    async fn test_remote_file_redirects_to_public_url() {
        let (server, service) = setup(InMemoryObjectStore::available());
        let saved = service.save(blob("a.txt"), "owner", None).await.unwrap();

        let response = server.get(&format!("/share/{}", saved.file.id)).await;

        response.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location"), saved.file.url.as_str());
    }

    #[tokio::test]
    async fn test_local_file_is_served_inline() {
        let (server, service) = setup(InMemoryObjectStore::without_bucket());
        let saved = service.save(blob("note.txt"), "owner", None).await.unwrap();

        let response = server.get(&format!("/share/{}", saved.file.id)).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/plain");
        assert_eq!(
            response.header("content-disposition"),
            "inline; filename=\"note.txt\""
        );
        assert_eq!(response.as_bytes().as_ref(), b"shared content");
    }

    #[tokio::test]
    async fn test_unknown_file_redirects_to_unavailable() {
        let (server, _) = setup(InMemoryObjectStore::available());

        let response = server.get("/share/does-not-exist").await;

        response.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location"), FILE_UNAVAILABLE_ROUTE);
    }

    #[tokio::test]
    async fn test_unavailable_route_is_not_found() {
        let (server, _) = setup(InMemoryObjectStore::available());

        let response = server.get(FILE_UNAVAILABLE_ROUTE).await;

        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "File not available");
    }
}
