use super::scaler::ScalerArtifact;
use super::svm::ClassifierArtifact;
use super::{ArtifactPair, Classifier, Scaler};
use crate::config::ArtifactConfig;
use crate::error::PredictError;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Where to look for the classifier and scaler files.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    base_dir: PathBuf,
    models_dir: String,
    classifier_file: String,
    scaler_file: String,
}

impl ArtifactLocator {
    pub fn new(config: &ArtifactConfig) -> Self {
        Self {
            base_dir: config.resolved_base_dir(),
            models_dir: config.models_dir.clone(),
            classifier_file: config.classifier_file.clone(),
            scaler_file: config.scaler_file.clone(),
        }
    }

    /// Primary location first, then the sibling models directory one level up.
    pub fn candidates(&self, file: &str) -> [PathBuf; 2] {
        [
            self.base_dir.join(&self.models_dir).join(file),
            self.base_dir.join("..").join(&self.models_dir).join(file),
        ]
    }

    fn find(&self, file: &str) -> Option<PathBuf> {
        self.candidates(file).into_iter().find(|p| p.is_file())
    }

    /// Resolves `(classifier, scaler)` paths, each file independently.
    pub fn resolve(&self) -> Result<(PathBuf, PathBuf), PredictError> {
        match (self.find(&self.classifier_file), self.find(&self.scaler_file)) {
            (Some(classifier), Some(scaler)) => Ok((classifier, scaler)),
            _ => Err(PredictError::ArtifactsNotFound {
                classifier: self.classifier_file.clone(),
                scaler: self.scaler_file.clone(),
            }),
        }
    }
}

/// Loads a fresh artifact pair from disk.
pub fn load_artifacts(locator: &ArtifactLocator) -> Result<ArtifactPair, PredictError> {
    let (classifier_path, scaler_path) = locator.resolve()?;

    let classifier = load_classifier(&classifier_path)?;
    let scaler = load_scaler(&scaler_path)?;

    tracing::info!(
        classifier = %classifier_path.display(),
        scaler = %scaler_path.display(),
        "loaded artifacts"
    );
    metrics::counter!("artifact_loads_total").increment(1);

    Ok(ArtifactPair { classifier, scaler })
}

pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, PredictError> {
    match extension(path) {
        Some("json") => Ok(Box::new(read_json::<ClassifierArtifact>(path)?)),
        #[cfg(feature = "onnx")]
        Some("onnx") => Ok(Box::new(super::onnx::OnnxClassifier(
            super::onnx::OnnxModel::load(path)?,
        ))),
        _ => Err(PredictError::UnsupportedArtifact(path.to_path_buf())),
    }
}

pub fn load_scaler(path: &Path) -> Result<Box<dyn Scaler>, PredictError> {
    match extension(path) {
        Some("json") => Ok(Box::new(read_json::<ScalerArtifact>(path)?)),
        #[cfg(feature = "onnx")]
        Some("onnx") => Ok(Box::new(super::onnx::OnnxScaler(
            super::onnx::OnnxModel::load(path)?,
        ))),
        _ => Err(PredictError::UnsupportedArtifact(path.to_path_buf())),
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PredictError> {
    let content = fs::read(path).map_err(|source| PredictError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| PredictError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })
}
