//! Image endpoints
//!
//! - `POST /api/upload` - store the multipart field `image`
//! - `GET /api/images` - list every object with a signed read URL
//! - `DELETE /api/images/{key}` - remove one object

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use bytes::Bytes;
use futures::future::try_join_all;
use tracing::info;

use crate::models::{AppState, SignedImage, UploadResponse};
use crate::storage::{self, NewObject, StorageError};
use crate::types::{AppError, AppResult};

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "image";

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route(
            "/api/upload",
            post(upload_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/images", get(list_images))
        .route("/api/images/{key}", delete(delete_image))
        .with_state(state)
}

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::TooLarge
        } else {
            AppError::InvalidRequest(err.body_text())
        }
    }
}

/// Pull the first `image` file part out of the form. Parts without a
/// filename are plain text fields, and an empty filename is what a browser
/// sends for an untouched file input; neither counts as a file.
async fn read_upload(multipart: &mut Multipart) -> AppResult<Option<UploadedFile>> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if upload.is_some() || field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        upload = Some(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Ok(upload)
}

pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    // A body that is not multipart/form-data carries no file at all
    let mut multipart = multipart.map_err(|_| AppError::NoFile)?;
    let file = read_upload(&mut multipart).await?.ok_or(AppError::NoFile)?;

    let object = NewObject {
        key: storage::object_key(&file.filename),
        content_type: storage::content_type_for(file.content_type.as_deref(), &file.filename),
        data: file.data,
    };
    info!(
        key = %object.key,
        content_type = %object.content_type,
        size = object.data.len(),
        "Uploading image"
    );

    let location = state.store.put(object).await.map_err(AppError::Upload)?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        location,
    }))
}

pub async fn list_images(State(state): State<AppState>) -> AppResult<Json<Vec<SignedImage>>> {
    let objects = state.store.list().await.map_err(AppError::List)?;
    let expiry = state.config.storage.presign_expiry_secs;
    let store = &state.store;

    // All-or-nothing: the first signing error fails the whole listing
    let images = try_join_all(objects.into_iter().map(|object| async move {
        let url = store.presign_get(&object.key, expiry).await?;
        Ok::<_, StorageError>(SignedImage {
            key: object.key,
            url,
        })
    }))
    .await
    .map_err(AppError::List)?;

    info!(count = images.len(), "Listed images");
    Ok(Json(images))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<&'static str> {
    state.store.delete(&key).await.map_err(AppError::Delete)?;
    info!(key = %key, "Deleted image");
    Ok("Image deleted successfully")
}
