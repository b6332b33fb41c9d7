//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use matchscore_core::{Prediction, ScoringRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::config::CorsConfig;
use crate::error::AppError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/features", get(features))
        .route("/score", post(score))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allow_any_origin {
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

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Liveness and artifact status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub features_loaded: bool,
    pub n_features: Option<usize>,
}

/// The ordered feature list every scoring request must cover
#[derive(Debug, Serialize, Deserialize)]
pub struct FeaturesResponse {
    pub features: Vec<String>,
    pub count: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    metrics::counter!("matchscore_requests_total", "endpoint" => "health").increment(1);

    let schema = state.artifacts.schema();
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.artifacts.model_loaded(),
        features_loaded: schema.is_some(),
        n_features: schema.map(|s| s.len()),
    })
}

async fn features(State(state): State<AppState>) -> Result<Json<FeaturesResponse>, AppError> {
    metrics::counter!("matchscore_requests_total", "endpoint" => "features").increment(1);

    let schema = state
        .artifacts
        .schema()
        .ok_or(AppError::NotReady("features not configured"))?;

    Ok(Json(FeaturesResponse {
        features: schema.names().to_vec(),
        count: schema.len(),
    }))
}

/// Score one JSON object.
///
/// Readiness is checked before the body is looked at, so an unloaded
/// service answers 500 regardless of what the client sent.
async fn score(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Prediction>, AppError> {
    metrics::counter!("matchscore_requests_total", "endpoint" => "score").increment(1);

    state.artifacts.ready()?;

    let Json(body) = body?;
    let request = ScoringRequest::try_from(body)
        .map_err(|e| AppError::InvalidRequest(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    debug!("Scoring request with {} fields", request.len());

    let prediction = state.artifacts.score(&request)?;
    Ok(Json(prediction))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn fallback() -> AppError {
    AppError::NotFound
}
