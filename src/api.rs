// 🌐 REST API - Request boundary for the analysis pipeline
// POST /api/analyze takes a JSON array of records with arbitrary field names.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::ingest::{detect_columns, ColumnMapping, RawTable};
use crate::report::{run_analysis, AnalysisResponse};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AnalysisConfig>,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Per-request overrides of the server config
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    pub threshold: Option<f64>,
    pub fuzzy_cutoff: Option<u8>,
}

impl AnalyzeParams {
    fn apply(&self, base: &AnalysisConfig) -> AnalysisConfig {
        let mut config = base.clone();
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(cutoff) = self.fuzzy_cutoff {
            config = config.with_fuzzy_cutoff(cutoff);
        }
        config
    }
}

// ============================================================================
// PIPELINE ENTRY
// ============================================================================

/// Records → auto-mapped dataset → report, all synchronous
pub fn analyze_records(
    records: &[Value],
    config: &AnalysisConfig,
) -> Result<AnalysisResponse, AnalysisError> {
    let raw = RawTable::from_json_records(records)?;
    let mapping = ColumnMapping::strict(detect_columns(&raw.headers))?;
    let outcome = raw.to_dataset(&mapping)?;

    if outcome.excluded() > 0 {
        log::info!("Dropped {} unparseable records", outcome.excluded());
    }

    let report = run_analysis(&outcome.dataset, config)?;
    Ok(report.to_response())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/analyze - Run every detector over the posted records
async fn analyze(
    State(state): State<AppState>,
    params: std::result::Result<Query<AnalyzeParams>, QueryRejection>,
    body: Bytes,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid query parameters: {}", rejection.body_text()),
            )
        }
    };

    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return error_response(StatusCode::BAD_REQUEST, "No data provided");
    }

    let records = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Array(records)) if !records.is_empty() => records,
        Ok(Value::Array(_)) | Ok(Value::Null) => {
            return error_response(StatusCode::BAD_REQUEST, "No data provided")
        }
        Ok(_) => {
            return error_response(StatusCode::BAD_REQUEST, "Expected a JSON array of records")
        }
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)),
    };

    let config = params.apply(&state.config);
    if let Err(e) = config.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    let record_count = records.len();
    let outcome = tokio::task::spawn_blocking(move || analyze_records(&records, &config)).await;

    match outcome {
        Ok(Ok(response)) => {
            log::info!(
                "Analyzed {} of {} records",
                response.summary.total_transactions,
                record_count
            );
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Ok(Err(e)) if e.is_caller_error() => {
            log::warn!("Rejected analysis request: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(e)) => {
            log::error!("Analysis failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            log::error!("Analysis task did not complete: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Analysis task failed")
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
