use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the parse → scale → predict pipeline.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model files not found. Please ensure {classifier} and {scaler} are in the models directory.")]
    ArtifactsNotFound { classifier: String, scaler: String },

    #[error("Failed to read artifact {}: {source}", .path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact {}: {source}", .path.display())]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported artifact format: {}", .0.display())]
    UnsupportedArtifact(PathBuf),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("No columns to parse from file")]
    NoColumns,

    #[error("Error tokenizing data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error tokenizing data. Expected {expected} fields in line {line}, saw {saw}")]
    RaggedRow {
        line: u64,
        expected: usize,
        saw: usize,
    },

    #[error("could not convert string to float: '{value}'")]
    InvalidValue { value: String },

    #[error("csv_data must be a string, got {0}")]
    InvalidPayload(&'static str),

    #[error("Found array with 0 sample(s) (shape=(0, {features})) while a minimum of 1 is required.")]
    EmptyInput { features: usize },

    #[error("X has {got} features, but {estimator} is expecting {expected} features as input.")]
    FeatureCountMismatch {
        got: usize,
        expected: usize,
        estimator: &'static str,
    },

    #[error("The feature names should match those that were passed during fit. Expected {expected:?}, got {got:?}")]
    FeatureNamesMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("Input X contains {0}.")]
    NonFinite(&'static str),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[cfg(feature = "onnx")]
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),
}

/// Coarse classification of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    ArtifactMissing,
    PredictionFailure,
    ServiceFailure,
}

/// Request-level failure rendered as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No CSV data provided")]
    MissingInput,

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictError),

    #[error("Service error: {0}")]
    Service(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::MissingInput => ErrorKind::MissingInput,
            ServiceError::Prediction(PredictError::ArtifactsNotFound { .. }) => {
                ErrorKind::ArtifactMissing
            }
            ServiceError::Prediction(_) => ErrorKind::PredictionFailure,
            ServiceError::Service(_) => ErrorKind::ServiceFailure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::MissingInput => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        match self.kind() {
            ErrorKind::MissingInput => tracing::debug!("{}", message),
            ErrorKind::ArtifactMissing | ErrorKind::PredictionFailure => {
                tracing::warn!(error = %message, "prediction failed")
            }
            ErrorKind::ServiceFailure => tracing::error!(error = %message, "service failure"),
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifacts_not_found_message() {
        let error = PredictError::ArtifactsNotFound {
            classifier: "svm_tuned_model.json".to_string(),
            scaler: "scaler.json".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Model files not found. Please ensure svm_tuned_model.json and scaler.json are in the models directory."
        );
    }

    #[test]
    fn test_feature_count_mismatch_message() {
        let error = PredictError::FeatureCountMismatch {
            got: 3,
            expected: 2,
            estimator: "StandardScaler",
        };
        assert_eq!(
            error.to_string(),
            "X has 3 features, but StandardScaler is expecting 2 features as input."
        );
    }

    #[test]
    fn test_prediction_failure_prefix() {
        let error = ServiceError::from(PredictError::NoColumns);
        assert_eq!(
            error.to_string(),
            "Prediction failed: No columns to parse from file"
        );
        assert_eq!(error.kind(), ErrorKind::PredictionFailure);
    }

    #[test]
    fn test_artifact_missing_kind() {
        let error = ServiceError::from(PredictError::ArtifactsNotFound {
            classifier: "a".to_string(),
            scaler: "b".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::ArtifactMissing);
        assert!(error.to_string().starts_with("Prediction failed: Model files not found"));
    }

    #[test]
    fn test_shape_error_conversion() {
        let shape_error = ndarray::ShapeError::from_kind(ndarray::ErrorKind::OutOfBounds);
        match PredictError::from(shape_error) {
            PredictError::Shape(_) => {}
            other => panic!("Expected Shape, got {other:?}"),
        }
    }

    #[test]
    fn test_into_response_missing_input() {
        let response = ServiceError::MissingInput.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_response_service_failure() {
        let response = ServiceError::Service("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
