//! Upload form parsing and download header helpers

use axum::extract::{multipart::MultipartError, Multipart};
use carepoint_common::{Error, Result};
use serde::Deserialize;
use uuid::Uuid;

/// Largest accepted file, in bytes
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const MAX_FILE_NAME_CHARS: usize = 255;
const MAX_CATEGORY_CHARS: usize = 100;

/// Fields of a multipart upload
#[derive(Debug)]
pub struct UploadForm {
    pub patient_user_id: Uuid,
    pub category: String,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// How a stored file is presented to the browser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Inline,
    Attachment,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Inline => "inline",
            ViewMode::Attachment => "attachment",
        }
    }
}

fn bad_multipart(e: MultipartError) -> Error {
    Error::Validation(format!("Invalid multipart upload: {}", e.body_text()))
}

/// Reduce a client-supplied name to a safe display name: no directory
/// components, quotes, or control characters.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .take(MAX_FILE_NAME_CHARS)
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Validate and normalise a category label
pub fn normalize_category(raw: &str) -> Result<String> {
    let category = raw.trim();
    if category.is_empty() {
        return Err(Error::Validation("category is required".to_string()));
    }
    if category.chars().count() > MAX_CATEGORY_CHARS {
        return Err(Error::Validation(format!(
            "category must be at most {} characters",
            MAX_CATEGORY_CHARS
        )));
    }
    Ok(category.to_string())
}

/// `Content-Disposition` value for a stored file
pub fn content_disposition(mode: ViewMode, file_name: &str) -> String {
    format!(
        "{}; filename=\"{}\"",
        mode.as_str(),
        sanitize_file_name(file_name)
    )
}

/// Read the `file`, `category`, and `patient_user_id` parts. Unknown parts
/// are ignored.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut patient_user_id = None;
    let mut category = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = sanitize_file_name(field.file_name().unwrap_or_default());
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                let content = field.bytes().await.map_err(bad_multipart)?;
                file = Some((file_name, content_type, content.to_vec()));
            }
            "category" => {
                let raw = field.text().await.map_err(bad_multipart)?;
                category = Some(normalize_category(&raw)?);
            }
            "patient_user_id" => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let id = Uuid::parse_str(raw.trim()).map_err(|_| {
                    Error::Validation("patient_user_id must be a UUID".to_string())
                })?;
                patient_user_id = Some(id);
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let (file_name, content_type, content) =
        file.ok_or_else(|| Error::Validation("file is required".to_string()))?;
    if content.is_empty() {
        return Err(Error::Validation("File is empty".to_string()));
    }
    if content.len() > MAX_UPLOAD_BYTES {
        return Err(Error::Validation(format!(
            "File exceeds the {} byte limit",
            MAX_UPLOAD_BYTES
        )));
    }

    Ok(UploadForm {
        patient_user_id: patient_user_id
            .ok_or_else(|| Error::Validation("patient_user_id is required".to_string()))?,
        category: category.ok_or_else(|| Error::Validation("category is required".to_string()))?,
        file_name,
        content_type,
        content,
    })
}
