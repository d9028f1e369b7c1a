use axum::{extract::rejection::JsonRejection, extract::State, Json};
use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ErrorKind, PredictError, ServiceError};
use crate::predictor::PredictionReport;
use crate::server::types::*;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::HEALTHY)
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionReport>, ServiceError> {
    let start = Instant::now();
    let result = run_prediction(&state, payload).await;
    histogram!("predict_duration_seconds").record(start.elapsed().as_secs_f64());

    match &result {
        Ok(report) => {
            counter!("predict_requests_total", "outcome" => "success").increment(1);
            for entry in &report.category_counts {
                counter!("predicted_rows_total", "label" => entry.category.clone())
                    .increment(entry.count as u64);
            }
            tracing::info!(rows = report.predictions.len(), "prediction completed");
        }
        Err(e) => {
            let outcome = match e.kind() {
                ErrorKind::MissingInput => "missing_input",
                ErrorKind::ArtifactMissing => "artifact_missing",
                ErrorKind::PredictionFailure => "prediction_failure",
                ErrorKind::ServiceFailure => "service_failure",
            };
            counter!("predict_requests_total", "outcome" => outcome).increment(1);
        }
    }

    result.map(Json)
}

async fn run_prediction(
    state: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<PredictionReport, ServiceError> {
    // 1. Body
    let Json(body) = payload.map_err(|rejection| ServiceError::Service(rejection.body_text()))?;
    let csv_text = extract_csv(body)?;

    // 2. Inference, off the async workers
    let predictor = Arc::clone(&state.predictor);
    let report = tokio::task::spawn_blocking(move || predictor.predict(&csv_text))
        .await
        .map_err(|e| ServiceError::Service(e.to_string()))??;

    Ok(report)
}

fn extract_csv(body: Value) -> Result<String, ServiceError> {
    let csv_data = match body {
        Value::Object(mut map) => map.remove("csv_data").ok_or(ServiceError::MissingInput)?,
        _ => return Err(ServiceError::MissingInput),
    };

    match csv_data {
        Value::String(text) => Ok(text),
        Value::Null => Ok(String::new()),
        other => Err(PredictError::InvalidPayload(json_type(&other)).into()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub async fn render_metrics(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_csv_string() {
        let csv = extract_csv(json!({"csv_data": "a,b\n1,2\n"})).unwrap();
        assert_eq!(csv, "a,b\n1,2\n");
    }

    #[test]
    fn test_extract_csv_missing_field() {
        let err = extract_csv(json!({"data": "a,b"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn test_extract_csv_non_object() {
        assert!(matches!(extract_csv(json!(null)), Err(ServiceError::MissingInput)));
        assert!(matches!(extract_csv(json!({})), Err(ServiceError::MissingInput)));
        assert!(matches!(
            extract_csv(json!(["csv_data"])),
            Err(ServiceError::MissingInput)
        ));
    }

    #[test]
    fn test_extract_csv_null_is_empty_text() {
        assert_eq!(extract_csv(json!({"csv_data": null})).unwrap(), "");
    }

    #[test]
    fn test_extract_csv_wrong_type() {
        let err = extract_csv(json!({"csv_data": 42})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Prediction failed: csv_data must be a string, got number"
        );
    }
}
