use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

pub const AUTHOR: &str = "Captando";
pub const GITHUB_URL: &str = "https://github.com/Captando";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub github: &'static str,
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            author: AUTHOR,
            github: GITHUB_URL,
        }),
    )
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{multipart_request, TestApp};
    use crate::resolver::MockStreamResolver;
    use crate::transcoder::MockTranscoder;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn get_health(app: &TestApp) -> (StatusCode, Value) {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_payload() {
        let app = TestApp::new(MockTranscoder::new(), MockStreamResolver::new());

        let (status, body) = get_health(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "ok",
                "version": "1.0.0",
                "author": "Captando",
                "github": "https://github.com/Captando"
            })
        );
    }

    #[tokio::test]
    async fn test_health_unaffected_by_other_requests() {
        let app = TestApp::new(MockTranscoder::new(), MockStreamResolver::new());
        let (_, before) = get_health(&app).await;

        let rejected = app
            .router
            .clone()
            .oneshot(multipart_request("video", "a.txt", "text/plain", b"x"))
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

        let (status, after) = get_health(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(before, after);
    }
}
