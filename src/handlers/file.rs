use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Response;

use super::download_response;
use crate::server::{ApiError, AppState};
use crate::storage::CleanupGuard;
use crate::transcoder::MediaInput;
use crate::upload;

/// POST /convert/file - convert an uploaded video to MP3
#[tracing::instrument(skip_all)]
pub async fn convert_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Request is not a multipart upload");
            return Err(ApiError::MissingFile);
        }
    };

    // Everything pushed here is removed when the response body is done, or
    // right away if we return early.
    let mut guard = CleanupGuard::default();

    let upload = upload::receive(&mut multipart, &state.store, &mut guard)
        .await?
        .ok_or(ApiError::MissingFile)?;

    let target = state.store.output_target();
    guard.push(&target.path);

    let permit = state
        .jobs
        .acquire()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    if let Err(e) = state
        .transcoder
        .convert(MediaInput::File(upload.path.clone()), &target.path)
        .await
    {
        tracing::error!(error = %e, input = %upload.path.display(), "File conversion failed");
        return Err(ApiError::FileConversion);
    }
    drop(permit);

    tracing::info!(input = %upload.path.display(), "File converted");

    download_response(&target.path, &target.download_name, guard).await
}
