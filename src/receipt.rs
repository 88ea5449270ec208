//! The upload relay: forwards one receipt image per request into object
//! storage and returns the stored object's public URL.
//!
//! Each request is independent; there is no deduplication, retry, or rate
//! limiting, and no state is held between requests.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::OffsetDateTime;

use crate::{AppState, Error, json_error, platform::ObjectStore};

/// The multipart field name the file is expected under.
const FILE_FIELD: &str = "file";

/// The extension used when the uploaded filename has none.
const DEFAULT_EXTENSION: &str = "jpg";

/// The state needed to relay a receipt upload.
#[derive(Clone)]
pub struct UploadReceiptState {
    /// The object storage capability of the data platform.
    pub objects: Arc<dyn ObjectStore>,
    /// The bucket receipts are stored in.
    pub bucket: String,
}

impl FromRef<AppState> for UploadReceiptState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            objects: state.objects.clone(),
            bucket: state.receipt_bucket.clone(),
        }
    }
}

/// A route handler that accepts one file in a multipart form, stores it, and
/// responds with the object's public URL.
///
/// Responses:
/// - `200` `{"publicUrl": "..."}` on success.
/// - `400` `{"error": "No file"}` when no file field is present; storage is
///   never contacted.
/// - `500` `{"error": "<storage message>"}` when the platform rejects the
///   upload.
/// - `500` `{"error": "Upload failed"}` for anything unexpected; the detail
///   is logged but never sent to the caller.
pub async fn upload_receipt_endpoint(
    State(state): State<UploadReceiptState>,
    multipart: Multipart,
) -> Response {
    match relay_file(&state, multipart).await {
        Ok(public_url) => (StatusCode::OK, Json(json!({ "publicUrl": public_url }))).into_response(),
        Err(Error::NoFile) => Error::NoFile.into_response(),
        Err(Error::Platform(message)) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
        Err(error) => {
            tracing::error!("Receipt upload failed: {error}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed")
        }
    }
}

/// Read the file field out of the multipart form, store its bytes, and
/// resolve the public URL.
async fn relay_file(
    state: &UploadReceiptState,
    mut multipart: Multipart,
) -> Result<String, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::Multipart(error.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|error| Error::Multipart(error.to_string()))?;

        let key = storage_key(&file_name, OffsetDateTime::now_utc());

        let path = state
            .objects
            .store_object(&state.bucket, &key, bytes.to_vec(), &content_type)
            .await?;

        return Ok(state.objects.public_url(&state.bucket, &path));
    }

    Err(Error::NoFile)
}

/// Derive the storage key `receipt-<epoch-milliseconds>.<extension>`.
///
/// The extension is the filename's suffix after the last `.`, falling back
/// to `jpg` when the filename has no extension at all.
fn storage_key(file_name: &str, now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, suffix)| suffix)
        .filter(|suffix| !suffix.is_empty())
        .unwrap_or(DEFAULT_EXTENSION);

    format!("receipt-{millis}.{extension}")
}
