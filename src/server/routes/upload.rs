//! Upload endpoint

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::request::UploadRequest;
use crate::types::response::{UploadError, UploadResponse};

/// POST /api/upload - store PDFs in the working directory and rebuild the
/// index over the batch
pub async fn upload_files(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let mut stored = Vec::new();
    let mut errors = Vec::new();

    for file in &request.files {
        match state.ingestor().ingest_encoded(&file.filename, &file.content) {
            Ok(()) => {
                tracing::info!("Stored upload: {}", file.filename);
                stored.push(file.filename.clone());
            }
            // A disk failure aborts the whole batch, rebuild included.
            Err(e @ Error::Io(_)) => return Err(e),
            Err(e) => {
                tracing::warn!("Rejected upload '{}': {}", file.filename, e);
                errors.push(UploadError {
                    filename: file.filename.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    // A batch that stored nothing must not trigger a rebuild. A failed
    // rebuild degrades to a reported error: the files are stored and index
    // on the next rebuild.
    let mut index_rebuilt = false;
    let mut index_error = None;
    if !stored.is_empty() {
        match state.builder().rebuild().await {
            Ok(_) => index_rebuilt = true,
            Err(e) => {
                tracing::error!("Index rebuild after upload failed: {}", e);
                index_error = Some(e.to_string());
            }
        }
    }

    Ok(Json(UploadResponse {
        stored,
        errors,
        index_rebuilt,
        index_error,
        selection: Vec::new(),
    }))
}
