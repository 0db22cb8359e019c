//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sentra_core::{BatchInput, BatchResult, HealthStatus, PredictionResult, TextInput};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::config::CorsConfig;
use crate::state::AppState;

/// Message returned by the health check
pub const HEALTH_MESSAGE: &str = "Sentiment API is running";

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/ping", get(health_check))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .route("/batch_predict", post(batch_predict))
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|o| o == "*") {
        if config.allow_credentials {
            warn!("CORS allows any origin; credentials are disabled for wildcard origins");
        }
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Wildcards cannot be combined with credentials, so mirror the request
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials)
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus::ok(HEALTH_MESSAGE))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics exporter not installed").into_response(),
    }
}

/// Single-text prediction
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<TextInput>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    metrics::counter!("sentra_requests_total", "endpoint" => "predict").increment(1);
    let Json(input) = payload?;
    debug!("Scoring single text ({} bytes)", input.text.len());

    let result = state.predict_one(input.text).await?;
    Ok(Json(result))
}

/// Batch prediction; results keep request order
async fn batch_predict(
    State(state): State<AppState>,
    payload: Result<Json<BatchInput>, JsonRejection>,
) -> Result<Json<BatchResult>, AppError> {
    metrics::counter!("sentra_requests_total", "endpoint" => "batch_predict").increment(1);
    let Json(input) = payload?;
    debug!("Scoring batch of {} texts", input.texts.len());

    let result = state.predict_batch(input.texts).await?;
    Ok(Json(result))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    /// The request body could not be parsed into the expected shape
    Rejected(StatusCode, String),
    /// Validation or inference failure
    Service(sentra_core::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Oversized bodies keep their 413; every other shape problem is a 422
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        AppError::Rejected(status, rejection.body_text())
    }
}

impl From<sentra_core::Error> for AppError {
    fn from(err: sentra_core::Error) -> Self {
        AppError::Service(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Rejected(status, msg) => (status, "validation_error", msg),
            AppError::Service(err) if err.is_client_error() => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.kind(), err.to_string())
            }
            AppError::Service(err) => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.kind(), err.to_string())
            }
        };

        metrics::counter!("sentra_errors_total", "kind" => kind).increment(1);

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
