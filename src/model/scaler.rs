use super::{ensure_features, Scaler};
use crate::error::PredictError;
use ndarray::{Array1, Array2, ArrayView2};
use serde::Deserialize;

/// JSON scaler artifact, tagged by `kind`.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

/// `(x - mean) / scale`; either half may be absent.
#[derive(Deserialize, Debug, Clone)]
#[serde(try_from = "StandardSpec")]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
    feature_names: Option<Vec<String>>,
    n_features: Option<usize>,
}

#[derive(Deserialize)]
struct StandardSpec {
    mean: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

impl TryFrom<StandardSpec> for StandardScaler {
    type Error = String;

    fn try_from(spec: StandardSpec) -> Result<Self, Self::Error> {
        let widths = [
            spec.mean.as_ref().map(Vec::len),
            spec.scale.as_ref().map(Vec::len),
            spec.feature_names.as_ref().map(Vec::len),
        ];
        let n_features = consistent_width(&widths)?;

        // zero variance columns pass through unscaled
        let scale = spec.scale.map(|s| {
            s.into_iter()
                .map(|v| if v == 0.0 { 1.0 } else { v })
                .collect::<Array1<f64>>()
        });

        Ok(Self {
            mean: spec.mean.map(Array1::from),
            scale,
            feature_names: spec.feature_names,
            n_features,
        })
    }
}

impl Scaler for StandardScaler {
    fn name(&self) -> &'static str {
        "StandardScaler"
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError> {
        if let Some(n) = self.n_features {
            ensure_features(self.name(), n, &x)?;
        }
        let mut out = x.to_owned();
        if let Some(mean) = &self.mean {
            out -= mean;
        }
        if let Some(scale) = &self.scale {
            out /= scale;
        }
        Ok(out)
    }
}

/// `x * scale + min`, optionally clipped to the fitted range.
#[derive(Deserialize, Debug, Clone)]
#[serde(try_from = "MinMaxSpec")]
pub struct MinMaxScaler {
    min: Array1<f64>,
    scale: Array1<f64>,
    clip: Option<(f64, f64)>,
    feature_names: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct MinMaxSpec {
    min: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    clip: bool,
    #[serde(default = "default_feature_range")]
    feature_range: (f64, f64),
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl TryFrom<MinMaxSpec> for MinMaxScaler {
    type Error = String;

    fn try_from(spec: MinMaxSpec) -> Result<Self, Self::Error> {
        let widths = [
            Some(spec.min.len()),
            Some(spec.scale.len()),
            spec.feature_names.as_ref().map(Vec::len),
        ];
        consistent_width(&widths)?;

        let (lo, hi) = spec.feature_range;
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return Err(format!("feature_range ({}, {}) is not increasing", lo, hi));
        }

        Ok(Self {
            min: Array1::from(spec.min),
            scale: Array1::from(spec.scale),
            clip: spec.clip.then_some(spec.feature_range),
            feature_names: spec.feature_names,
        })
    }
}

impl Scaler for MinMaxScaler {
    fn name(&self) -> &'static str {
        "MinMaxScaler"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.min.len())
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError> {
        ensure_features(self.name(), self.min.len(), &x)?;
        let mut out = x.to_owned();
        out *= &self.scale;
        out += &self.min;
        if let Some((lo, hi)) = self.clip {
            out.mapv_inplace(|v| v.clamp(lo, hi));
        }
        Ok(out)
    }
}

impl Scaler for ScalerArtifact {
    fn name(&self) -> &'static str {
        match self {
            ScalerArtifact::Standard(s) => s.name(),
            ScalerArtifact::MinMax(s) => s.name(),
        }
    }

    fn n_features(&self) -> Option<usize> {
        match self {
            ScalerArtifact::Standard(s) => s.n_features(),
            ScalerArtifact::MinMax(s) => s.n_features(),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            ScalerArtifact::Standard(s) => s.feature_names(),
            ScalerArtifact::MinMax(s) => s.feature_names(),
        }
    }

    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError> {
        match self {
            ScalerArtifact::Standard(s) => s.transform(x),
            ScalerArtifact::MinMax(s) => s.transform(x),
        }
    }
}

fn consistent_width(widths: &[Option<usize>]) -> Result<Option<usize>, String> {
    let mut known = widths.iter().flatten();
    let first = known.next().copied();
    if let Some(n) = first {
        if let Some(other) = known.find(|&&w| w != n) {
            return Err(format!(
                "scaler parameters disagree on feature count ({} vs {})",
                n, other
            ));
        }
    }
    Ok(first)
}
