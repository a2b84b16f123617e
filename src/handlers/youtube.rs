use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use super::download_response;
use crate::resolver::ResolveError;
use crate::server::{ApiError, AppState};
use crate::storage::CleanupGuard;
use crate::transcoder::{MediaInput, TranscodeError};
use crate::utils;

#[derive(Error, Debug)]
enum ProcessingError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}

/// Pull a usable `url` out of a JSON body.
///
/// Non-JSON bodies, non-string values and empty strings all count as missing.
fn extract_url(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    value
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// POST /convert/youtube - convert a web video to MP3
#[tracing::instrument(skip_all)]
pub async fn convert_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let url = extract_url(&body).ok_or(ApiError::MissingUrl)?;

    let target = state.store.output_target();
    // The source is streamed, so the output is the only file this request owns
    let guard = CleanupGuard::new([&target.path]);

    let permit = state
        .jobs
        .acquire()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    tracing::info!(url = %url, "Starting URL conversion");

    let title = match resolve_and_convert(&state, &url, &target.path).await {
        Ok(title) => title,
        Err(e) => {
            tracing::error!(error = %e, url = %url, "URL conversion failed");
            return Err(ApiError::VideoProcessing(e.to_string()));
        }
    };
    drop(permit);

    let filename = utils::sanitize_title(&title);
    tracing::info!(title = %title, "URL converted");

    download_response(&target.path, &filename, guard).await
}

async fn resolve_and_convert(
    state: &AppState,
    url: &str,
    output: &Path,
) -> Result<String, ProcessingError> {
    let remote = state.resolver.fetch(url).await?;

    state
        .transcoder
        .convert(MediaInput::Stream(remote.stream), output)
        .await?;

    Ok(remote.title)
}
