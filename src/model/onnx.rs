use super::{Classifier, Scaler};
use crate::error::PredictError;
use ndarray::{Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

// Initialize the global environment for ORT (only needed once)
fn init_ort() {
    INIT.call_once(|| {
        if let Err(e) = ort::init().with_name("traffic-classifier").commit() {
            tracing::warn!(error = %e, "ONNX Runtime environment init failed, using defaults");
        }
    });
}

fn build_session(path: &Path) -> ort::Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(1)?
        .commit_from_file(path)?;
    Ok(session)
}

/// An ONNX graph taking a single `[rows, features]` float tensor.
pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxModel {
    pub fn load(path: &Path) -> Result<Self, PredictError> {
        init_ort();

        let session = build_session(path)?;
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| {
                PredictError::InvalidArtifact(format!("{} declares no inputs", path.display()))
            })?;

        tracing::debug!(path = %path.display(), input = %input_name, "loaded ONNX graph");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    fn input_value(&self, x: ArrayView2<'_, f64>) -> Result<Value, PredictError> {
        let shape = vec![x.nrows(), x.ncols()];
        let data: Vec<f32> = x.iter().map(|&v| v as f32).collect();
        Ok(Value::from_array((shape, data.into_boxed_slice()))?.into_dyn())
    }
}

/// Scaler graph: float in, float out of the same shape.
pub struct OnnxScaler(pub OnnxModel);

impl Scaler for OnnxScaler {
    fn name(&self) -> &'static str {
        "OnnxScaler"
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError> {
        let model = &self.0;
        let input = model.input_value(x)?;
        let mut session = model.session.lock().unwrap_or_else(|e| e.into_inner());
        let outputs = session.run(ort::inputs![model.input_name.as_str() => input])?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 2 || dims[0] != x.nrows() {
            return Err(PredictError::InvalidArtifact(format!(
                "scaler graph returned shape {:?} for {} rows",
                dims,
                x.nrows()
            )));
        }
        let values = data.iter().map(|&v| f64::from(v)).collect();
        Ok(Array2::from_shape_vec((dims[0], dims[1]), values)?)
    }
}

/// Classifier graph whose first output is the int64 label tensor.
pub struct OnnxClassifier(pub OnnxModel);

impl Classifier for OnnxClassifier {
    fn name(&self) -> &'static str {
        "OnnxClassifier"
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<i64>, PredictError> {
        let model = &self.0;
        let input = model.input_value(x)?;
        let mut session = model.session.lock().unwrap_or_else(|e| e.into_inner());
        let outputs = session.run(ort::inputs![model.input_name.as_str() => input])?;

        let (_, labels) = outputs[0].try_extract_tensor::<i64>()?;
        if labels.len() != x.nrows() {
            return Err(PredictError::InvalidArtifact(format!(
                "classifier graph returned {} labels for {} rows",
                labels.len(),
                x.nrows()
            )));
        }
        Ok(labels.to_vec())
    }
}
