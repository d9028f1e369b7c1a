pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod scaler;
pub mod store;
pub mod svm;

use crate::error::PredictError;
use ndarray::{Array2, ArrayView2};

/// Feature transformation fitted offline and applied before classification.
pub trait Scaler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of input columns, when the artifact records it.
    fn n_features(&self) -> Option<usize>;

    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError>;
}

/// Maps scaled feature rows to integer class ids.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn n_features(&self) -> Option<usize>;

    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<i64>, PredictError>;
}

/// A classifier with the scaler it was trained behind.
pub struct ArtifactPair {
    pub classifier: Box<dyn Classifier>,
    pub scaler: Box<dyn Scaler>,
}

pub(crate) fn ensure_features(
    estimator: &'static str,
    expected: usize,
    x: &ArrayView2<'_, f64>,
) -> Result<(), PredictError> {
    if x.ncols() != expected {
        return Err(PredictError::FeatureCountMismatch {
            got: x.ncols(),
            expected,
            estimator,
        });
    }
    Ok(())
}

/// Packs nested rows into a matrix, rejecting ragged input.
pub(crate) fn to_matrix(rows: Vec<Vec<f64>>, what: &str) -> Result<Array2<f64>, String> {
    let n_rows = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|r| r.len() != width) {
        return Err(format!(
            "{} row {} has {} values, expected {}",
            what,
            bad,
            rows[bad].len(),
            width
        ));
    }
    let data: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, width), data).map_err(|e| format!("{}: {}", what, e))
}
