//! api-server — HTTP API turning a user-supplied link into a QR code.
//!
//! Exposes the validation and encoding pipeline as a single endpoint:
//! - `POST /api/generate` with `{"url": "<link>"}` returns `{"dataUrl": "data:image/png;base64,..."}`
//!   or `{"error": "<message>"}` with a 4xx/5xx status.
//! - `GET /health` for liveness checks.
//! - CORS: Configurable via CORS_ALLOW_ORIGIN (origin string) for the frontend.
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional (default 4000)
//! cargo run -p api-server
//!
//! # JSON logs and a tighter DNS bound
//! LOG_FORMAT=json RESOLVE_TIMEOUT_MS=1500 cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.
//!

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dns_resolver::SystemResolver;
use domain::service::QrService;
use domain::{DomainResolver, PipelineError, QrEncoder};
use http_common::GenerateOut;
use qr_encoder::PngQrEncoder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type DynQrService = QrService<Arc<dyn DomainResolver>, Arc<dyn QrEncoder>>;

#[derive(Clone)]
struct AppState {
    service: Arc<DynQrService>,
}

impl AppState {
    fn new(resolver: Arc<dyn DomainResolver>, encoder: Arc<dyn QrEncoder>) -> Self {
        Self {
            service: Arc::new(QrService::new(resolver, encoder)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_permissive();

    let state = AppState::new(
        Arc::new(SystemResolver::new(cfg.resolve_timeout)),
        Arc::new(PngQrEncoder::new()),
    );

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let app = router(state)
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(cors_layer(&cfg.cors_allow_origin));

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, err = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(%addr, resolve_timeout_ms = cfg.resolve_timeout.as_millis() as u64, "api-server listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(err = %e, "server error");
        std::process::exit(1);
    }
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// CORS - origin already validated in Config::from_env()
fn cors_layer(origin: &HeaderValue) -> CorsLayer {
    if origin.as_bytes() == b"*" {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([origin.clone()]))
            .allow_methods([axum::http::Method::POST, axum::http::Method::OPTIONS])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate_qr))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(http_common::MAX_BODY_BYTES))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn generate_qr(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let outcome = match body {
        Ok(Json(body)) => match http_common::url_field(&body) {
            Ok(raw) => state.service.generate(raw).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(rejection_to_error(&rejection)),
    };

    match outcome {
        Ok(image) => {
            info!(mime = %image.mime_type(), "qr generated");
            (StatusCode::OK, Json(GenerateOut::from(&image))).into_response()
        }
        Err(e) => {
            if e.is_client_fault() {
                warn!(err = %e, "generate rejected");
            } else {
                error!(err = %e, "generate failed");
            }
            let (status, body) = http_common::error_parts(&e);
            (status, Json(body)).into_response()
        }
    }
}

// A non-JSON content type is read as an empty body, so no `url` field.
fn rejection_to_error(rejection: &JsonRejection) -> PipelineError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => PipelineError::MissingUrl,
        r if r.status() == StatusCode::PAYLOAD_TOO_LARGE => PipelineError::PayloadTooLarge,
        r => PipelineError::UnreadableBody(r.body_text()),
    }
}
