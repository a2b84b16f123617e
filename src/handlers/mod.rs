//! HTTP route handlers

pub mod file;
pub mod health;
pub mod youtube;

pub use file::convert_file;
pub use health::health;
pub use youtube::convert_url;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::Path;
use tokio_util::io::ReaderStream;

use crate::server::ApiError;
use crate::storage::{CleanupGuard, GuardedStream};

/// MIME type of every converted file
pub const MP3_CONTENT_TYPE: &str = "audio/mpeg";

/// Stream a converted file back as an attachment.
///
/// The guard travels with the body, so the request's files are deleted once
/// the download finishes or the client disconnects.
pub(crate) async fn download_response(
    path: &Path,
    download_name: &str,
    guard: CleanupGuard,
) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| anyhow::Error::new(e).context(format!("failed to open {}", path.display())))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| anyhow::Error::new(e).context("failed to read output metadata"))?
        .len();

    tracing::info!(
        file = download_name,
        size = %crate::utils::format_file_size(file_size),
        "Sending converted file"
    );

    let stream = GuardedStream::new(ReaderStream::new(file), guard);
    let disposition = format!("attachment; filename=\"{}\"", download_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, MP3_CONTENT_TYPE.to_string()),
            (header::CONTENT_LENGTH, file_size.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::Router;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::resolver::StreamResolver;
    use crate::server::{build_router, AppState};
    use crate::storage::TempFileStore;
    use crate::transcoder::Transcoder;

    const BOUNDARY: &str = "video2mp3-test-boundary";

    pub struct TestApp {
        pub router: Router,
        pub store: TempFileStore,
        _dir: TempDir,
    }

    impl TestApp {
        pub fn new(transcoder: impl Transcoder + 'static, resolver: impl StreamResolver + 'static) -> Self {
            Self::with_state(transcoder, resolver, |state| state)
        }

        /// Like `new`, with a chance to adjust the state before routing
        pub fn with_state(
            transcoder: impl Transcoder + 'static,
            resolver: impl StreamResolver + 'static,
            configure: impl FnOnce(AppState) -> AppState,
        ) -> Self {
            let dir = TempDir::new().unwrap();
            let store = TempFileStore::new(dir.path().join("uploads"), dir.path().join("output"));
            store.ensure_directories().unwrap();

            let state = AppState::new(store.clone(), Arc::new(transcoder), Arc::new(resolver), 2);

            Self {
                router: build_router(configure(state)),
                store,
                _dir: dir,
            }
        }

        pub fn uploads(&self) -> usize {
            count_entries(self.store.uploads_dir())
        }

        pub fn outputs(&self) -> usize {
            count_entries(self.store.output_dir())
        }
    }

    fn count_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    /// A single-part multipart request to `/convert/file`
    pub fn multipart_request(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/convert/file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// A multipart request with only a text field
    pub fn multipart_text_request(field: &str, value: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
        );

        Request::builder()
            .method("POST")
            .uri("/convert/file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    pub fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
