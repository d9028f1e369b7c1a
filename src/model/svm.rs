use super::{ensure_features, to_matrix, Classifier};
use crate::error::PredictError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Deserialize;

/// JSON classifier artifact, tagged by `kind`.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Svc(SvcModel),
    Linear(LinearModel),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Rbf {
        gamma: f64,
    },
    Poly {
        gamma: f64,
        #[serde(default)]
        coef0: f64,
        #[serde(default = "default_degree")]
        degree: i32,
    },
    Sigmoid {
        gamma: f64,
        #[serde(default)]
        coef0: f64,
    },
}

fn default_degree() -> i32 {
    3
}

impl Kernel {
    pub fn eval(&self, x: ArrayView1<'_, f64>, sv: ArrayView1<'_, f64>) -> f64 {
        match *self {
            Kernel::Linear => x.dot(&sv),
            Kernel::Rbf { gamma } => {
                let dist: f64 = x.iter().zip(sv.iter()).map(|(a, b)| (a - b).powi(2)).sum();
                (-gamma * dist).exp()
            }
            Kernel::Poly {
                gamma,
                coef0,
                degree,
            } => (gamma * x.dot(&sv) + coef0).powi(degree),
            Kernel::Sigmoid { gamma, coef0 } => (gamma * x.dot(&sv) + coef0).tanh(),
        }
    }
}

/// Kernel SVM with one-vs-one voting over every class pair.
///
/// Support vectors are grouped by class, `n_support[i]` of them for
/// `classes[i]`. For the pair `(i, j)` the decision value is the weighted
/// kernel sum over both groups plus `intercept[p]`, where `p` enumerates
/// pairs in `(0,1), (0,2), .., (1,2), ..` order. A positive value is a vote
/// for `i`. The class with most votes wins, ties going to the lower index.
#[derive(Deserialize, Debug, Clone)]
#[serde(try_from = "SvcSpec")]
pub struct SvcModel {
    kernel: Kernel,
    classes: Vec<i64>,
    n_support: Vec<usize>,
    starts: Vec<usize>,
    support_vectors: Array2<f64>,
    dual_coef: Array2<f64>,
    intercept: Vec<f64>,
    feature_names: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct SvcSpec {
    kernel: Kernel,
    classes: Vec<i64>,
    n_support: Vec<usize>,
    support_vectors: Vec<Vec<f64>>,
    dual_coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

impl TryFrom<SvcSpec> for SvcModel {
    type Error = String;

    fn try_from(spec: SvcSpec) -> Result<Self, Self::Error> {
        let n_class = spec.classes.len();
        if n_class < 2 {
            return Err(format!("svc needs at least 2 classes, got {}", n_class));
        }
        if spec.n_support.len() != n_class {
            return Err(format!(
                "n_support has {} entries for {} classes",
                spec.n_support.len(),
                n_class
            ));
        }

        let support_vectors = to_matrix(spec.support_vectors, "support_vectors")?;
        let n_sv = support_vectors.nrows();
        let total: usize = spec.n_support.iter().sum();
        if n_sv == 0 || total != n_sv {
            return Err(format!(
                "n_support sums to {} but there are {} support vectors",
                total, n_sv
            ));
        }

        let dual_coef = to_matrix(spec.dual_coef, "dual_coef")?;
        if dual_coef.nrows() != n_class - 1 || dual_coef.ncols() != n_sv {
            return Err(format!(
                "dual_coef has shape {:?}, expected [{}, {}]",
                dual_coef.shape(),
                n_class - 1,
                n_sv
            ));
        }

        let n_pairs = n_class * (n_class - 1) / 2;
        if spec.intercept.len() != n_pairs {
            return Err(format!(
                "intercept has {} entries, expected {} for {} classes",
                spec.intercept.len(),
                n_pairs,
                n_class
            ));
        }

        check_feature_names(&spec.feature_names, support_vectors.ncols())?;

        let starts = spec
            .n_support
            .iter()
            .scan(0, |offset, &n| {
                let start = *offset;
                *offset += n;
                Some(start)
            })
            .collect();

        Ok(Self {
            kernel: spec.kernel,
            classes: spec.classes,
            n_support: spec.n_support,
            starts,
            support_vectors,
            dual_coef,
            intercept: spec.intercept,
            feature_names: spec.feature_names,
        })
    }
}

impl SvcModel {
    fn predict_row(&self, x: ArrayView1<'_, f64>) -> i64 {
        let kvalue: Vec<f64> = self
            .support_vectors
            .outer_iter()
            .map(|sv| self.kernel.eval(x, sv))
            .collect();

        let n_class = self.classes.len();
        let mut votes = vec![0usize; n_class];
        let mut p = 0;
        for i in 0..n_class {
            for j in (i + 1)..n_class {
                let coef_i = self.dual_coef.row(j - 1);
                let coef_j = self.dual_coef.row(i);
                let group_i = self.starts[i]..self.starts[i] + self.n_support[i];
                let group_j = self.starts[j]..self.starts[j] + self.n_support[j];

                let mut sum = self.intercept[p];
                sum += group_i.map(|k| coef_i[k] * kvalue[k]).sum::<f64>();
                sum += group_j.map(|k| coef_j[k] * kvalue[k]).sum::<f64>();

                if sum > 0.0 {
                    votes[i] += 1;
                } else {
                    votes[j] += 1;
                }
                p += 1;
            }
        }

        self.classes[first_max(votes.iter().map(|&v| v as f64))]
    }
}

impl Classifier for SvcModel {
    fn name(&self) -> &'static str {
        "SVC"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.support_vectors.ncols())
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<i64>, PredictError> {
        ensure_features(self.name(), self.support_vectors.ncols(), &x)?;
        Ok(x.outer_iter().map(|row| self.predict_row(row)).collect())
    }
}

/// One linear decision function per class (or a single one for binary
/// problems, positive meaning `classes[1]`).
#[derive(Deserialize, Debug, Clone)]
#[serde(try_from = "LinearSpec")]
pub struct LinearModel {
    coef: Array2<f64>,
    intercept: Array1<f64>,
    classes: Vec<i64>,
    feature_names: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct LinearSpec {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    classes: Vec<i64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

impl TryFrom<LinearSpec> for LinearModel {
    type Error = String;

    fn try_from(spec: LinearSpec) -> Result<Self, Self::Error> {
        let coef = to_matrix(spec.coef, "coef")?;
        if coef.nrows() == 0 {
            return Err("coef is empty".to_string());
        }
        if spec.intercept.len() != coef.nrows() {
            return Err(format!(
                "intercept has {} entries for {} coef rows",
                spec.intercept.len(),
                coef.nrows()
            ));
        }
        let expected_classes = if coef.nrows() == 1 { 2 } else { coef.nrows() };
        if spec.classes.len() != expected_classes {
            return Err(format!(
                "{} coef rows need {} classes, got {}",
                coef.nrows(),
                expected_classes,
                spec.classes.len()
            ));
        }
        check_feature_names(&spec.feature_names, coef.ncols())?;

        Ok(Self {
            coef,
            intercept: Array1::from(spec.intercept),
            classes: spec.classes,
            feature_names: spec.feature_names,
        })
    }
}

impl Classifier for LinearModel {
    fn name(&self) -> &'static str {
        "LinearModel"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.ncols())
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<i64>, PredictError> {
        ensure_features(self.name(), self.coef.ncols(), &x)?;
        let scores = x.dot(&self.coef.t()) + &self.intercept;

        let predictions = scores
            .axis_iter(Axis(0))
            .map(|row| {
                if self.coef.nrows() == 1 {
                    self.classes[usize::from(row[0] > 0.0)]
                } else {
                    self.classes[first_max(row.iter().copied())]
                }
            })
            .collect();
        Ok(predictions)
    }
}

impl Classifier for ClassifierArtifact {
    fn name(&self) -> &'static str {
        match self {
            ClassifierArtifact::Svc(m) => m.name(),
            ClassifierArtifact::Linear(m) => m.name(),
        }
    }

    fn n_features(&self) -> Option<usize> {
        match self {
            ClassifierArtifact::Svc(m) => m.n_features(),
            ClassifierArtifact::Linear(m) => m.n_features(),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            ClassifierArtifact::Svc(m) => m.feature_names(),
            ClassifierArtifact::Linear(m) => m.feature_names(),
        }
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<i64>, PredictError> {
        match self {
            ClassifierArtifact::Svc(m) => m.predict(x),
            ClassifierArtifact::Linear(m) => m.predict(x),
        }
    }
}

/// Index of the first maximum.
fn first_max(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

fn check_feature_names(names: &Option<Vec<String>>, width: usize) -> Result<(), String> {
    match names {
        Some(names) if names.len() != width => Err(format!(
            "{} feature names for {} features",
            names.len(),
            width
        )),
        _ => Ok(()),
    }
}
