use axum::extract::multipart::{Multipart, MultipartError};
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::storage::{CleanupGuard, TempFileStore};

/// Multipart field carrying the video
pub const FIELD_NAME: &str = "video";

/// A video written to the incoming directory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Absolute path of the stored file
    pub path: PathBuf,

    /// Declared media type
    pub content_type: String,

    /// File name sent by the client
    pub original_name: Option<String>,

    /// Bytes written
    pub size: u64,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Arquivo não suportado. Envie apenas vídeos.")]
    UnsupportedMediaType(String),

    #[error("Failed to read upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Check the declared type is a video
pub fn is_video_type(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("video/")
}

/// Store the `video` field of a multipart request.
///
/// Returns `Ok(None)` when the request carries no such file; a `video` text
/// field does not count. The type is checked before anything touches the
/// disk; once the target path exists it is registered with `guard`, so a
/// failed or interrupted write leaves no file.
pub async fn receive(
    multipart: &mut Multipart,
    store: &TempFileStore,
    guard: &mut CleanupGuard,
) -> Result<Option<UploadedFile>, UploadError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FIELD_NAME) {
            tracing::debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        // Without a filename the part is a plain form value, not a file
        if field.file_name().is_none() {
            tracing::debug!("Skipping non-file video field");
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let original_name = field.file_name().map(str::to_string);

        if !is_video_type(&content_type) {
            tracing::warn!(content_type = %content_type, "Rejected non-video upload");
            return Err(UploadError::UnsupportedMediaType(content_type));
        }

        let path = store.upload_path(original_name.as_deref());
        guard.push(&path);

        let mut file = tokio::fs::File::create(&path).await?;
        let mut size = 0u64;

        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!(
            path = %path.display(),
            content_type = %content_type,
            size = %crate::utils::format_file_size(size),
            "Upload stored"
        );

        return Ok(Some(UploadedFile {
            path,
            content_type,
            original_name,
            size,
        }));
    }

    Ok(None)
}
