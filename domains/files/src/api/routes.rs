//! Route definitions for Files domain API

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Router,
};

use super::handlers::files;
use super::middleware::FilesState;
use crate::domain::upload::MAX_UPLOAD_BYTES;

/// Create all Files domain routes
pub fn routes() -> Router<FilesState> {
    Router::new()
        .route("/v1/files", get(files::list_my_files).post(files::upload_file))
        .route(
            "/v1/files/{id}",
            patch(files::update_file_details).delete(files::delete_file),
        )
        .route("/v1/files/{id}/download", get(files::download_file))
        .route("/v1/files/{id}/view", get(files::view_file))
        .route("/v1/patients/{id}/files", get(files::list_patient_files))
        // Multipart overhead on top of the largest accepted file
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}
