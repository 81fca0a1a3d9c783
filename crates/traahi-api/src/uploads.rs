use std::path::Path;

use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, header},
};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use traahi_types::api::{GalleryUploadResponse, UploadResponse};

use crate::AppState;
use crate::error::{ApiError, ApiResult};

pub const COVER_FIELD: &str = "coverImageFile";
pub const GALLERY_FIELD: &str = "galleryImages";
pub const MAX_GALLERY_FILES: usize = 5;

/// POST /upload: single cover image. Returns its public URL.
pub async fn upload_cover(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut stored = save_files(&state, multipart, COVER_FIELD, 1).await?;
    let Some(name) = stored.pop() else {
        return Err(ApiError::Validation("No file uploaded.".into()));
    };

    Ok(Json(UploadResponse {
        file_path: public_url(&state, &headers, &name),
    }))
}

/// POST /upload-gallery: up to five gallery images.
pub async fn upload_gallery(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<GalleryUploadResponse>> {
    let stored = save_files(&state, multipart, GALLERY_FIELD, MAX_GALLERY_FILES).await?;
    if stored.is_empty() {
        return Err(ApiError::Validation("No files uploaded.".into()));
    }

    Ok(Json(GalleryUploadResponse {
        file_paths: stored
            .iter()
            .map(|name| public_url(&state, &headers, name))
            .collect(),
    }))
}

/// Write every part named `field` into the upload dir and return the stored
/// file names. On any failure the files written so far are removed, so a
/// rejected request leaves nothing behind.
async fn save_files(
    state: &AppState,
    mut multipart: Multipart,
    field: &str,
    max_files: usize,
) -> ApiResult<Vec<String>> {
    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| {
            error!("Failed to create upload directory: {}", e);
            ApiError::Internal(e.into())
        })?;

    let mut stored = Vec::new();
    match write_parts(state, &mut multipart, field, max_files, &mut stored).await {
        Ok(()) => Ok(stored),
        Err(e) => {
            discard(&state.upload_dir, &stored).await;
            Err(e)
        }
    }
}

async fn write_parts(
    state: &AppState,
    multipart: &mut Multipart,
    field: &str,
    max_files: usize,
    stored: &mut Vec<String>,
) -> ApiResult<()> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed upload: {e}")))?
    {
        if part.name() != Some(field) {
            continue;
        }
        if stored.len() == max_files {
            return Err(ApiError::Validation(format!(
                "At most {max_files} files may be uploaded."
            )));
        }

        let name = stored_name(field, part.file_name());
        let bytes = part
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Malformed upload: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::Validation("Uploaded file is empty.".into()));
        }

        let path = state.upload_dir.join(&name);
        let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
            error!("Failed to create file {}: {}", path.display(), e);
            ApiError::Internal(e.into())
        })?;
        // Tracked before writing so a failed write is cleaned up too.
        stored.push(name);
        file.write_all(&bytes).await.map_err(|e| {
            error!("Failed to write file {}: {}", path.display(), e);
            ApiError::Internal(e.into())
        })?;

        info!("Stored upload {} ({} bytes)", path.display(), bytes.len());
    }

    Ok(())
}

async fn discard(dir: &Path, names: &[String]) {
    for name in names {
        let path = dir.join(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove rejected upload {}: {}", path.display(), e);
        }
    }
}

/// `<field>-<millis>-<uuid><.ext>`. Only an alphanumeric extension survives
/// from the client's file name, so nothing user-controlled reaches the path.
fn stored_name(field: &str, original: Option<&str>) -> String {
    let ext = original
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "{}-{}-{}{}",
        field,
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        ext
    )
}

fn public_url(state: &AppState, headers: &HeaderMap, name: &str) -> String {
    let base = match &state.public_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    };
    format!("{base}/uploads/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_keeps_safe_extension_only() {
        let name = stored_name(COVER_FIELD, Some("beach photo.JPG"));
        assert!(name.starts_with("coverImageFile-"));
        assert!(name.ends_with(".jpg"));

        let sneaky = stored_name(COVER_FIELD, Some("x.p/../hp"));
        assert!(!sneaky.contains('/'));
        assert!(!sneaky.contains(".."));

        let bare = stored_name(GALLERY_FIELD, None);
        assert!(!bare.contains('.'));
    }
}
