//! HTTP error responses.
//!
//! Every handler returns `Result<T, ApiError>`. Failures from external
//! processes are logged with full detail where they happen; the response only
//! carries the message meant for the caller, as `{"error": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::upload::UploadError;

pub const MISSING_FILE_MESSAGE: &str = "Nenhum arquivo foi enviado";
pub const MISSING_URL_MESSAGE: &str = "URL não fornecida";
pub const FILE_CONVERSION_MESSAGE: &str = "Erro na conversão do arquivo";
pub const UPLOAD_TOO_LARGE_MESSAGE: &str = "Arquivo excede o tamanho máximo permitido";

#[derive(Debug, Error)]
pub enum ApiError {
    /// No `video` field in the upload
    #[error("{}", MISSING_FILE_MESSAGE)]
    MissingFile,

    /// No usable `url` in the JSON body
    #[error("{}", MISSING_URL_MESSAGE)]
    MissingUrl,

    /// The upload went over the configured body limit
    #[error("{}", UPLOAD_TOO_LARGE_MESSAGE)]
    UploadTooLarge,

    /// The caller sent an invalid or malformed request
    #[error("{1}")]
    BadRequest(StatusCode, String),

    /// Converting an uploaded file failed
    #[error("{}", FILE_CONVERSION_MESSAGE)]
    FileConversion,

    /// Resolving or converting a URL failed
    #[error("Erro ao processar o vídeo: {0}")]
    VideoProcessing(String),

    /// An unclassified internal server error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ApiError::UploadTooLarge
            }
            UploadError::Multipart(e) => ApiError::BadRequest(e.status(), e.body_text()),
            UploadError::Io(e) => {
                ApiError::Internal(anyhow::Error::new(e).context("failed to store upload"))
            }
            unsupported @ UploadError::UnsupportedMediaType(_) => {
                ApiError::BadRequest(StatusCode::BAD_REQUEST, unsupported.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingFile | ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadRequest(status, _) => *status,
            ApiError::FileConversion | ApiError::VideoProcessing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match self {
            ApiError::Internal(_) => "Erro interno do servidor".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_client_errors() {
        let response = ApiError::MissingFile.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Nenhum arquivo foi enviado" }));

        let response = ApiError::MissingUrl.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "URL não fornecida" }));
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let response = ApiError::UploadTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Arquivo excede o tamanho máximo permitido" })
        );
    }

    #[tokio::test]
    async fn test_processing_error_includes_detail() {
        let response = ApiError::VideoProcessing("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Erro ao processar o vídeo: boom" })
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::from(anyhow::anyhow!("/srv/secret/path missing")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "Erro interno do servidor" }));
    }

    #[tokio::test]
    async fn test_unsupported_upload_maps_to_bad_request() {
        let err: ApiError = UploadError::UnsupportedMediaType("image/png".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Arquivo não suportado. Envie apenas vídeos." })
        );
    }
}
