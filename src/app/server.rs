//! HTTP surface: liveness probe and the `/ocr` upload endpoint.

use crate::adapters::upload;
use crate::core::pipeline::RequestPipeline;
use crate::domain::model::ContactRecord;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CardError, Result};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and non-image fields on top of the image limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Application state shared across routes. Holds no mutable state.
pub struct AppState<C: ConfigProvider> {
    pub pipeline: RequestPipeline<C>,
}

impl<C: ConfigProvider> AppState<C> {
    pub fn new(pipeline: RequestPipeline<C>) -> Self {
        Self { pipeline }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

/// Build the Axum router with all API routes.
pub fn build_router<C: ConfigProvider + 'static>(state: Arc<AppState<C>>) -> Router {
    let body_limit = state
        .pipeline
        .config()
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(health))
        .route("/ocr", post(ocr_upload::<C>))
        .layer(DefaultBodyLimit::max(usize::try_from(body_limit).unwrap_or(usize::MAX)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Handler for `GET /`
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "OCR API is running",
    })
}

/// Handler for `POST /ocr`
async fn ocr_upload<C: ConfigProvider + 'static>(
    State(state): State<Arc<AppState<C>>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let development = state.pipeline.config().development();
    match recognize_upload(&state, multipart).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(&e, development),
    }
}

async fn recognize_upload<C: ConfigProvider>(
    state: &AppState<C>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ContactRecord> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Request is not a multipart upload: {}", rejection);
        CardError::NoFileUploaded
    })?;

    let config = state.pipeline.config();
    let image =
        upload::receive_image(&mut multipart, config.upload_dir(), config.max_file_size_bytes()).await?;
    state.pipeline.process(image).await
}

fn error_response(err: &CardError, development: bool) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_client_error() {
        tracing::warn!("Rejected upload: {}", err);
    }

    let body = match err {
        CardError::NoFileUploaded => ErrorResponse {
            error: err.to_string(),
            details: None,
            stack: None,
        },
        CardError::FileTooLarge { .. } | CardError::Multipart(_)
            if status == StatusCode::PAYLOAD_TOO_LARGE =>
        {
            ErrorResponse {
                error: "File too large".to_string(),
                details: Some(err.to_string()),
                stack: None,
            }
        }
        CardError::Multipart(_) => ErrorResponse {
            error: "Invalid upload".to_string(),
            details: Some(err.to_string()),
            stack: None,
        },
        _ => {
            tracing::error!("❌ OCR request failed: {} (Category: {:?})", err, err.category());
            ErrorResponse {
                error: "OCR failed".to_string(),
                details: Some(err.to_string()),
                stack: development.then(|| err.source_chain()),
            }
        }
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_no_file_body() {
        let response = error_response(&CardError::NoFileUploaded, true);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "No image file uploaded" })
        );
    }

    #[tokio::test]
    async fn test_stack_only_in_development() {
        let err = CardError::extraction_failed(CardError::ExternalProcessError { exit_code: 1 });

        let body = body_json(error_response(&err, false)).await;
        assert_eq!(body["error"], "OCR failed");
        assert_eq!(
            body["details"],
            "Entity extraction failed: External process exited with status 1"
        );
        assert!(body.get("stack").is_none());

        let response = error_response(&err, true);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["stack"]
            .as_str()
            .unwrap()
            .contains("caused by: External process exited with status 1"));
    }

    #[tokio::test]
    async fn test_file_too_large_status() {
        let response = error_response(&CardError::FileTooLarge { limit: 10 }, false);
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"], "File too large");
    }

    #[tokio::test]
    async fn test_body_limit_before_image_is_413() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::{header, Request};

        // A text part larger than the default 2 MiB body limit, ahead of the image.
        let mut body = Vec::new();
        body.extend_from_slice(b"--XBOUNDARY\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\n");
        body.extend(std::iter::repeat(b'a').take(3 * 1024 * 1024));
        body.extend_from_slice(
            b"\r\n--XBOUNDARY\r\nContent-Disposition: form-data; name=\"image\"; filename=\"card.png\"\r\n\
              Content-Type: image/png\r\n\r\nabc\r\n--XBOUNDARY--\r\n",
        );
        let request = Request::builder()
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let err = upload::receive_image(&mut multipart, dir.path(), 1024)
            .await
            .unwrap_err();

        assert!(matches!(err, CardError::Multipart(_)));
        assert_eq!(err.status_code(), 413);

        let response = error_response(&err, false);
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"], "File too large");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "OK");
    }
}
