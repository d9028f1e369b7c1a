//! The parse → scale → predict → label → count pipeline.

use crate::error::PredictError;
use crate::labels::label_for;
use crate::model::store::ArtifactStore;
use crate::model::ArtifactPair;
use crate::preprocessing::{parse_csv, FeatureTable};
use serde::Serialize;
use std::sync::Arc;

pub const SUCCESS_MESSAGE: &str = "Predictions completed successfully";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord {
    pub index: usize,
    pub category: i64,
    pub label: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PredictionReport {
    pub predictions: Vec<PredictionRecord>,
    #[serde(rename = "categoryCounts")]
    pub category_counts: Vec<CategoryCount>,
    pub message: String,
}

pub struct Predictor {
    store: Arc<ArtifactStore>,
}

impl Predictor {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn predict(&self, csv_text: &str) -> Result<PredictionReport, PredictError> {
        let artifacts = self.store.load()?;
        let table = parse_csv(csv_text)?;
        run(&artifacts, &table)
    }
}

/// Applies an artifact pair to an already parsed table.
pub fn run(artifacts: &ArtifactPair, table: &FeatureTable) -> Result<PredictionReport, PredictError> {
    let scaler = artifacts.scaler.as_ref();
    let classifier = artifacts.classifier.as_ref();

    if let Some(expected) = scaler.n_features() {
        if expected != table.n_features() {
            return Err(PredictError::FeatureCountMismatch {
                got: table.n_features(),
                expected,
                estimator: scaler.name(),
            });
        }
    }
    check_feature_names(scaler.feature_names(), &table.columns)?;

    if table.n_rows() == 0 {
        return Err(PredictError::EmptyInput {
            features: table.n_features(),
        });
    }

    let scaled = scaler.transform(table.values.view())?;
    if scaled.iter().any(|v| v.is_nan()) {
        return Err(PredictError::NonFinite("NaN"));
    }
    if scaled.iter().any(|v| v.is_infinite()) {
        return Err(PredictError::NonFinite(
            "infinity or a value too large for dtype('float64')",
        ));
    }

    check_feature_names(classifier.feature_names(), &table.columns)?;
    let classes = classifier.predict(scaled.view())?;

    let predictions: Vec<PredictionRecord> = classes
        .into_iter()
        .enumerate()
        .map(|(index, category)| PredictionRecord {
            index,
            category,
            label: label_for(category).into_owned(),
        })
        .collect();
    let category_counts = count_categories(&predictions);

    Ok(PredictionReport {
        predictions,
        category_counts,
        message: SUCCESS_MESSAGE.to_string(),
    })
}

/// Tallies labels in first-seen order.
pub fn count_categories(predictions: &[PredictionRecord]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for prediction in predictions {
        match counts.iter_mut().find(|c| c.category == prediction.label) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: prediction.label.clone(),
                count: 1,
            }),
        }
    }
    counts
}

fn check_feature_names(expected: Option<&[String]>, got: &[String]) -> Result<(), PredictError> {
    match expected {
        Some(names) if names != got => Err(PredictError::FeatureNamesMismatch {
            expected: names.to_vec(),
            got: got.to_vec(),
        }),
        _ => Ok(()),
    }
}
