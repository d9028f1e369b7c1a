use crate::predictor::Predictor;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;

/// Shared Application State
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub metrics: Option<PrometheusHandle>,
}

// --- DTOs (Data Transfer Objects) ---
// The /predict success body is `predictor::PredictionReport`; failures are
// rendered by `ServiceError`.

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl HealthResponse {
    pub const HEALTHY: HealthResponse = HealthResponse {
        status: "healthy",
        message: "ML service is running",
    };
}
