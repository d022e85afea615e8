use std::path::Path;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::{extract_all, ResumeRecord};
use crate::state::AppState;
use crate::validation::FieldViolation;

/// Upper bound on accepted upload size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub data: ResumeRecord,
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

struct Upload {
    file_name: String,
    bytes: Bytes,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        return Ok(Upload { file_name, bytes });
    }
    Err(AppError::Validation(vec![FieldViolation::missing(FILE_FIELD)]))
}

/// Spools the upload into a temp file that keeps its extension, so the
/// reader can tell PDFs apart. The file is deleted when dropped.
async fn spool(upload: &Upload) -> Result<NamedTempFile, AppError> {
    let suffix = Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let temp = tempfile::Builder::new()
        .prefix("upload_")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| AppError::Internal(e.into()))?;

    tokio::fs::write(temp.path(), &upload.bytes)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(temp)
}

/// POST /api/v1/ai/parse
///
/// Multipart upload with a `file` field; returns every extracted résumé field.
pub async fn handle_parse(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    info!(
        "Parsing upload '{}' ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let temp = spool(&upload).await?;
    let data = extract_all(temp.path(), &state.extractor, &state.usage_log).await?;

    Ok(Json(ParseResponse { data }))
}
