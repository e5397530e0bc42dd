//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panic recovery, security headers)
//! - Size the body limit for the upload route
//! - Serve until shutdown, then drain within the grace period

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::error::panic_response;
use crate::http::handlers::{health, process_upload, test_endpoint};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::observability::tracing::make_request_span;
use crate::security::headers::security_headers;
use crate::security::UploadLimit;
use crate::transform::{build_transform, Transform};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub transform: Arc<dyn Transform>,
    pub field: Arc<str>,
    pub limit: UploadLimit,
}

/// Error type for a running server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("in-flight requests did not finish within {grace_secs}s, forcing shutdown")]
    ForcedShutdown { grace_secs: u64 },
}

/// HTTP server for the image processing service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    transform: Arc<dyn Transform>,
}

impl HttpServer {
    /// Create a new HTTP server running the configured transform.
    pub fn new(config: ServiceConfig) -> Self {
        let transform = build_transform(&config.transform);
        Self::with_transform(config, transform)
    }

    /// Create a server around an already-built transform.
    pub fn with_transform(config: ServiceConfig, transform: Arc<dyn Transform>) -> Self {
        let state = AppState {
            transform: transform.clone(),
            field: config.upload_field().into(),
            limit: UploadLimit::new(config.upload_limit()),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            transform,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let body_limit = match state.limit.body_limit() {
            Some(max) => DefaultBodyLimit::max(max),
            None => DefaultBodyLimit::disable(),
        };

        let mut router = Router::new()
            .route("/health", get(health))
            .route("/api/v1/test", get(test_endpoint))
            .route(&config.upload_route(), post(process_upload).layer(body_limit))
            .with_state(state);

        if config.security.enable_headers {
            for (name, value) in security_headers() {
                router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
            }
        }

        router
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain.
    ///
    /// After the signal no new connections are accepted. In-flight requests
    /// get `shutdown.grace_secs` to finish; past that the server task is
    /// aborted and [`ServerError::ForcedShutdown`] is returned.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let grace_secs = self.config.shutdown.grace_secs;
        tracing::info!(
            address = %addr,
            route = %self.config.upload_route(),
            transform = self.transform.name(),
            "HTTP server starting"
        );

        let stop = shutdown.triggered();
        let drain = shutdown.triggered();
        let app = self.router;

        let mut serving = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(drain)
                .await
        });

        tokio::select! {
            joined = &mut serving => {
                joined??;
                tracing::info!("HTTP server stopped");
                return Ok(());
            }
            _ = stop => {}
        }

        tracing::info!(grace_secs, "Draining in-flight requests");
        match tokio::time::timeout(Duration::from_secs(grace_secs), &mut serving).await {
            Ok(joined) => joined??,
            Err(_) => {
                serving.abort();
                tracing::error!(grace_secs, "Grace period elapsed, closing remaining connections");
                return Err(ServerError::ForcedShutdown { grace_secs });
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformVariant;
    use crate::transform::{Processed, TransformError};
    use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const BOUNDARY: &str = "XTESTBOUNDARYX";

    /// Echoes input and counts invocations.
    struct Spy {
        calls: AtomicUsize,
    }

    impl Transform for Spy {
        fn name(&self) -> &'static str {
            "spy"
        }

        fn apply(&self, input: &[u8]) -> Result<Processed, TransformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Processed {
                bytes: input.to_vec(),
                content_type: "application/octet-stream",
            })
        }
    }

    struct Panicking;

    impl Transform for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn apply(&self, _input: &[u8]) -> Result<Processed, TransformError> {
            panic!("transform blew up")
        }
    }

    fn spy_server(config: ServiceConfig) -> (Router, Arc<Spy>) {
        let spy = Arc::new(Spy {
            calls: AtomicUsize::new(0),
        });
        let server = HttpServer::with_transform(config, spy.clone());
        (server.router(), spy)
    }

    fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_error(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_before_any_upload() {
        let (app, spy) = spy_server(ServiceConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_test_endpoint() {
        let (app, _) = spy_server(ServiceConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/api/v1/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["message"], "Server is running");
        assert_eq!(value["status"], 200);
    }

    #[tokio::test]
    async fn test_successful_upload() {
        let (app, spy) = spy_server(ServiceConfig::default());

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("image", Some("cat.jpg"), b"pixels")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"processed_cat.jpg\""
        );
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(response.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"pixels");
        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_field_is_400() {
        let (app, spy) = spy_server(ServiceConfig::default());

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("other", Some("cat.jpg"), b"x")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_error(response).await, "No file uploaded");
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_field_without_filename_is_missing() {
        let (app, _) = spy_server(ServiceConfig::default());

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("image", None, b"x")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_400() {
        let (app, _) = spy_server(ServiceConfig::default());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/image")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_error(response).await, "No file uploaded");
    }

    #[tokio::test]
    async fn test_oversize_never_reaches_transform() {
        let mut config = ServiceConfig::default();
        config.upload.max_bytes = 1024;
        let (app, spy) = spy_server(config);

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("image", Some("big.jpg"), &[7u8; 4096])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_error(response).await, "File size exceeds 1KB");
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exactly_at_ceiling_is_accepted() {
        let mut config = ServiceConfig::default();
        config.upload.max_bytes = 1024;
        let (app, spy) = spy_server(config);

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("image", Some("ok.jpg"), &[7u8; 1024])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unenforced_ceiling_accepts_large_upload() {
        let mut config = ServiceConfig::default();
        config.upload.max_bytes = 16;
        config.upload.enforce_limit = false;
        let (app, spy) = spy_server(config);

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("image", Some("a.bin"), &[1u8; 4 * 1024 * 1024])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transform_failure_is_500() {
        let app = HttpServer::new(ServiceConfig::default()).router();

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("image", Some("cat.jpg"), b"not a jpeg")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_error(response).await.starts_with("Image process failed: "));
    }

    #[tokio::test]
    async fn test_panicking_transform_is_500() {
        let app = HttpServer::with_transform(ServiceConfig::default(), Arc::new(Panicking)).router();

        let response = app
            .oneshot(upload("/api/v1/image", multipart_body("image", Some("cat.jpg"), b"x")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!json_error(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_passthrough_route_and_field() {
        let mut config = ServiceConfig::default();
        config.transform.variant = TransformVariant::Passthrough;
        config.transform.header = "HDR:".into();
        let app = HttpServer::new(config).router();

        let response = app
            .oneshot(upload("/api/v1/file", multipart_body("file", Some("notes.txt"), b"body")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"HDR:body");
    }

    #[tokio::test]
    async fn test_client_request_id_propagated() {
        let (app, _) = spy_server(ServiceConfig::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(X_REQUEST_ID, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
    }

    #[tokio::test]
    async fn test_security_headers_can_be_disabled() {
        let mut config = ServiceConfig::default();
        config.security.enable_headers = false;
        let (app, _) = spy_server(config);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(!response.headers().contains_key(X_CONTENT_TYPE_OPTIONS));
    }

    #[tokio::test]
    async fn test_run_honours_trigger_sent_before_start() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let server = HttpServer::new(ServiceConfig::default());
        let result = tokio::time::timeout(Duration::from_secs(2), server.run(listener, &shutdown)).await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
