use std::{io::ErrorKind, sync::Arc};

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use event_filter::{codegen, Event, FilterOutcome};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::recorder::{extract_event_names, RecorderError};

use super::{
    types::{BatchResponse, ErrorResponse, TransformRequest, TransformResponse},
    ApiState,
};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn record_batch(State(state): State<Arc<ApiState>>, body: Bytes) -> ApiResult<BatchResponse> {
    let payload: Value = serde_json::from_slice(&body).map_err(|err| {
        warn!(error = %err, "rejected batch with invalid JSON");
        error_response(StatusCode::BAD_REQUEST, "INVALID_JSON", "error decoding JSON", None)
    })?;

    let names = extract_event_names(&payload, &state.config.event_name_field)
        .map_err(map_recorder_error)?;

    let recorded = state.recorder.record(&names).await.map_err(map_recorder_error)?;

    Ok(Json(BatchResponse {
        status: "ok".to_string(),
        recorded,
    }))
}

#[instrument(skip(state))]
pub async fn source_config(State(state): State<Arc<ApiState>>) -> ApiResult<Value> {
    let path = &state.config.source_config_path;

    let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            error_response(
                StatusCode::NOT_FOUND,
                "CONFIG_NOT_FOUND",
                "configuration file not found",
                None,
            )
        } else {
            error!(path = %path.display(), error = %err, "failed to read source config");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_READ_FAILED",
                "configuration file could not be read",
                None,
            )
        }
    })?;

    let config: Value = serde_json::from_str(&raw).map_err(|err| {
        error!(path = %path.display(), error = %err, "source config is not valid JSON");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INVALID_CONFIG",
            "configuration file is not valid JSON",
            Some(json!({ "reason": err.to_string() })),
        )
    })?;

    Ok(Json(config))
}

/// Serves the transformation snippet: a hand-written file when one is
/// configured, otherwise source generated from the active deny rule.
#[instrument(skip(state))]
pub async fn transform_source(State(state): State<Arc<ApiState>>) -> Result<String, ApiError> {
    if let Some(path) = &state.config.transform_source_path {
        let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
            warn!(path = %path.display(), error = %err, "transform source unavailable");
            error_response(
                StatusCode::NOT_FOUND,
                "TRANSFORM_NOT_FOUND",
                "transformation source not found",
                None,
            )
        })?;

        return codegen::extract_transform_function(&raw).ok_or_else(|| {
            error_response(
                StatusCode::NOT_FOUND,
                "TRANSFORM_NOT_FOUND",
                "no transformEvent function found in transformation source",
                None,
            )
        });
    }

    match &state.filter {
        Some(filter) => Ok(codegen::generate_transform(filter.rule())),
        None => Err(no_rule_configured()),
    }
}

/// Runs one event through the configured filter. `metadata` in the body is
/// ignored.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn transform(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> ApiResult<TransformResponse> {
    let filter = state.filter.as_ref().ok_or_else(no_rule_configured)?;

    let request: TransformRequest = serde_json::from_slice(&body).map_err(|err| {
        warn!(error = %err, "rejected transform request");
        if err.is_data() {
            error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_EVENT",
                "request body must carry an event",
                Some(json!({ "reason": err.to_string() })),
            )
        } else {
            error_response(StatusCode::BAD_REQUEST, "INVALID_JSON", "error decoding JSON", None)
        }
    })?;

    let event = Event::from_value(request.event).ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_EVENT",
            "event must be a JSON object",
            None,
        )
    })?;

    let outcome = filter.apply(event);
    let outcome_label = outcome.as_str().to_string();
    let match_kind = match &outcome {
        FilterOutcome::Passed(_) => None,
        FilterOutcome::Renamed { match_kind, .. } | FilterOutcome::Suppressed { match_kind, .. } => {
            Some(match_kind.to_string())
        }
    };

    info!(outcome = %outcome_label, "event transformed");

    Ok(Json(TransformResponse {
        event: outcome.into_event(),
        outcome: outcome_label,
        match_kind,
    }))
}

#[instrument(skip(state))]
pub async fn health_check(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "event-collector",
        "rule_configured": state.filter.is_some()
    }))
}

fn map_recorder_error(err: RecorderError) -> ApiError {
    match err {
        RecorderError::InvalidBatch(reason) => error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_BATCH",
            "invalid batch payload",
            Some(json!({ "reason": reason })),
        ),
        RecorderError::OutputMissing(path) => {
            error!(path = %path.display(), "batch output file does not exist");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "RECORD_FAILED",
                "server error",
                None,
            )
        }
        err @ RecorderError::Io { .. } => {
            error!(error = ?err, "failed to record batch");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "RECORD_FAILED",
                "server error",
                None,
            )
        }
    }
}

fn no_rule_configured() -> ApiError {
    error_response(
        StatusCode::NOT_FOUND,
        "NO_RULE_CONFIGURED",
        "no deny rule is configured",
        None,
    )
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<Value>,
) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details,
        }),
    )
}
