//! Patient file API handlers
//!
//! Only admins and doctors upload, edit, or delete files. Reads follow
//! patient isolation: a patient sees only their own files, and a file
//! owned by someone else looks exactly like a missing one.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use carepoint_auth::{AuthContext, AuthUser, ClinicianUser, Role};
use carepoint_common::{Error, RepositoryError, Result, ValidatedJson};
use carepoint_storage::{StorageError, StoredObject};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::FilesState;
use crate::domain::entities::{FileRecord, FileResponse};
use crate::domain::upload::{
    content_disposition, normalize_category, read_upload_form, sanitize_file_name, ViewMode,
    DEFAULT_CONTENT_TYPE,
};

/// Request for renaming or recategorising a file
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFileDetailsRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewFileQuery {
    #[serde(default)]
    pub mode: ViewMode,
}

fn file_not_found() -> Error {
    Error::NotFound("File not found".to_string())
}

fn storage_error(e: StorageError) -> Error {
    match e {
        StorageError::NotFound(_) => Error::NotFound("File content not found".to_string()),
        other => Error::Storage(other.to_string()),
    }
}

fn non_empty(files: Vec<FileRecord>) -> Result<Json<Vec<FileResponse>>> {
    if files.is_empty() {
        return Err(Error::NotFound("No files found".to_string()));
    }
    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

/// Fetch a file the caller may read
async fn find_readable(
    state: &FilesState,
    auth_context: &AuthContext,
    file_id: Uuid,
) -> Result<FileRecord> {
    let file = state
        .files
        .find_by_id(file_id)
        .await?
        .ok_or_else(file_not_found)?;

    if !auth_context.can_access_patient(file.owner_user_id) {
        return Err(file_not_found());
    }
    Ok(file)
}

/// Build a byte response carrying the stored content type
fn file_response(file: &FileRecord, object: StoredObject, mode: ViewMode) -> Result<Response> {
    let content_type = object
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .or_else(|| HeaderValue::from_str(&file.content_type).ok())
        .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&content_disposition(mode, &file.file_name))
        .map_err(|e| Error::Internal(format!("Invalid content disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        object.content,
    )
        .into_response())
}

/// Upload a file for a patient. The blob is written first; if the metadata
/// write then fails the blob is removed again.
pub async fn upload_file(
    ClinicianUser(auth_context): ClinicianUser,
    State(state): State<FilesState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FileResponse>)> {
    let form = read_upload_form(multipart).await?;

    let patient = state
        .users
        .find_by_id(form.patient_user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Patient not found".to_string()))?;
    if patient.role != Role::Patient {
        return Err(Error::Validation(format!(
            "User {} is not a patient",
            patient.id
        )));
    }

    let size_bytes = i64::try_from(form.content.len())
        .map_err(|_| Error::Validation("File is too large".to_string()))?;
    let record = FileRecord::new(
        patient.id,
        form.category,
        form.file_name,
        form.content_type,
        size_bytes,
        auth_context.user_id,
    );

    state
        .storage
        .put(&record.blob_key, form.content, Some(&record.content_type))
        .await
        .map_err(storage_error)?;

    let created = match state.files.create(&record).await {
        Ok(created) => created,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&record.blob_key).await {
                tracing::warn!(
                    blob_key = %record.blob_key,
                    error = %cleanup,
                    "Failed to remove blob after metadata write failed"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        file_id = %created.id,
        patient_id = %created.owner_user_id,
        size_bytes = created.size_bytes,
        storage = state.storage.service_name(),
        actor = %auth_context.user_id,
        "File uploaded"
    );
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List the caller's own files
pub async fn list_my_files(
    AuthUser(auth_context): AuthUser,
    State(state): State<FilesState>,
) -> Result<Json<Vec<FileResponse>>> {
    let files = state.files.list_for_owner(auth_context.user_id).await?;
    non_empty(files)
}

/// List one patient's files
pub async fn list_patient_files(
    AuthUser(auth_context): AuthUser,
    State(state): State<FilesState>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<FileResponse>>> {
    if !auth_context.can_access_patient(patient_id) {
        return Err(Error::Authorization(
            "You can only access your own files".to_string(),
        ));
    }

    let files = state.files.list_for_owner(patient_id).await?;
    non_empty(files)
}

/// Download a file as an attachment
pub async fn download_file(
    AuthUser(auth_context): AuthUser,
    State(state): State<FilesState>,
    Path(file_id): Path<Uuid>,
) -> Result<Response> {
    let file = find_readable(&state, &auth_context, file_id).await?;
    let object = state
        .storage
        .get(&file.blob_key)
        .await
        .map_err(storage_error)?;

    file_response(&file, object, ViewMode::Attachment)
}

/// Serve a file for display in the browser
pub async fn view_file(
    AuthUser(auth_context): AuthUser,
    State(state): State<FilesState>,
    Path(file_id): Path<Uuid>,
    Query(params): Query<ViewFileQuery>,
) -> Result<Response> {
    let file = find_readable(&state, &auth_context, file_id).await?;
    let object = state
        .storage
        .get(&file.blob_key)
        .await
        .map_err(storage_error)?;

    let mut response = file_response(&file, object, params.mode)?;
    response
        .headers_mut()
        .insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    Ok(response)
}

/// Rename or recategorise a file; the editor becomes its uploader of record
pub async fn update_file_details(
    ClinicianUser(auth_context): ClinicianUser,
    State(state): State<FilesState>,
    Path(file_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateFileDetailsRequest>,
) -> Result<Json<FileResponse>> {
    let file_name = request.file_name.as_deref().map(sanitize_file_name);
    let category = request
        .category
        .as_deref()
        .map(normalize_category)
        .transpose()?;

    let updated = state
        .files
        .update_details(
            file_id,
            file_name.as_deref(),
            category.as_deref(),
            auth_context.user_id,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => file_not_found(),
            other => other.into(),
        })?;

    tracing::info!(file_id = %updated.id, actor = %auth_context.user_id, "File details updated");
    Ok(Json(updated.into()))
}

/// Delete a file's blob, then its metadata
pub async fn delete_file(
    ClinicianUser(auth_context): ClinicianUser,
    State(state): State<FilesState>,
    Path(file_id): Path<Uuid>,
) -> Result<StatusCode> {
    let file = state
        .files
        .find_by_id(file_id)
        .await?
        .ok_or_else(file_not_found)?;

    state
        .storage
        .delete(&file.blob_key)
        .await
        .map_err(storage_error)?;
    state.files.delete(file.id).await.map_err(|e| match e {
        RepositoryError::NotFound => file_not_found(),
        other => other.into(),
    })?;

    tracing::info!(file_id = %file.id, actor = %auth_context.user_id, "File deleted");
    Ok(StatusCode::NO_CONTENT)
}
