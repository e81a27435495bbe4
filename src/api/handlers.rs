use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::{PREDICTIONS_TOTAL, PREDICTION_DURATION_SECONDS, PREDICTION_ERRORS_TOTAL};
use crate::ml::{ModelHandle, ModelMetadata};
use crate::models::{FeatureRecord, PredictRequest, PredictionResponse, PredictionResult};
use crate::session::Session;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

/// Score a survey submission and remember the result in the caller's session
pub async fn predict(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<Json<PredictionResponse>> {
    let result = match score_submission(&state.model, &body) {
        Ok(result) => result,
        Err(e) => {
            PREDICTION_ERRORS_TOTAL
                .with_label_values(&[e.error_code()])
                .inc();
            return Err(e);
        }
    };

    PREDICTIONS_TOTAL
        .with_label_values(&[result.satisfaction_class.as_str()])
        .inc();

    session.set_prediction(result.clone()).await;

    Ok(Json(PredictionResponse::from(result)))
}

/// Parse the raw body, run the classifier and map its class for display
fn score_submission(model: &ModelHandle, body: &[u8]) -> Result<PredictionResult> {
    let model = model.as_ref().ok_or(AppError::ModelUnavailable)?;

    let raw: Value = serde_json::from_slice(body)?;
    let record = FeatureRecord::from(PredictRequest::from_json(&raw)?);

    let timer = PREDICTION_DURATION_SECONDS.start_timer();
    let class = model.predict(&record)?;
    timer.observe_duration();

    let result = PredictionResult::from_class(class, raw);
    tracing::debug!(
        class,
        satisfaction = %result.satisfaction_class,
        "Prediction completed"
    );

    Ok(result)
}

/// Forget the stored prediction
pub async fn clear_prediction(session: Session) -> Json<Value> {
    session.clear_prediction().await;
    Json(json!({ "success": true }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.model.as_ref().map(|m| m.metadata().clone());
    let uptime = chrono::Utc::now() - state.started_at;

    Json(HealthResponse {
        status: if model.is_some() { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        model_loaded: model.is_some(),
        model,
        active_sessions: state.sessions.store().entry_count(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelMetadata>,
    pub active_sessions: u64,
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
