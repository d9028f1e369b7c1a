//! Artifact files shared by the test suites.

use crate::config::ArtifactConfig;
use std::fs;
use std::path::Path;

/// Identity scaler over `f1,f2`.
pub const SCALER_JSON: &str = r#"{
    "kind": "standard",
    "mean": [0.0, 0.0],
    "scale": [1.0, 1.0],
    "feature_names": ["f1", "f2"]
}"#;

/// Picks class 0 for small `f1` and class 3 for large `f1`.
pub const CLASSIFIER_JSON: &str = r#"{
    "kind": "linear",
    "coef": [[-1.0, 0.0], [0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [0.0, 0.0]],
    "intercept": [10.0, 0.0, 0.0, 6.0, 0.0],
    "classes": [0, 1, 2, 3, 4]
}"#;

/// Three-class SVC emitting the unmapped class 9 for the negative quadrant.
pub const SVC_JSON: &str = r#"{
    "kind": "svc",
    "kernel": {"type": "linear"},
    "classes": [2, 3, 9],
    "n_support": [1, 1, 1],
    "support_vectors": [[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]],
    "dual_coef": [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
    "intercept": [0.0, 0.0, 0.0]
}"#;

pub fn artifact_config(base: &Path) -> ArtifactConfig {
    ArtifactConfig {
        base_dir: Some(base.to_path_buf()),
        ..ArtifactConfig::default()
    }
}

pub fn write_artifacts(models_dir: &Path) {
    write_artifacts_with(models_dir, CLASSIFIER_JSON, SCALER_JSON);
}

pub fn write_artifacts_with(models_dir: &Path, classifier: &str, scaler: &str) {
    fs::create_dir_all(models_dir).unwrap();
    fs::write(models_dir.join("svm_tuned_model.json"), classifier).unwrap();
    fs::write(models_dir.join("scaler.json"), scaler).unwrap();
}
