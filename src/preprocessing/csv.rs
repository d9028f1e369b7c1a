use crate::error::PredictError;
use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::Array2;

/// Tokens read as a missing value.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

/// Parsed CSV payload: header names plus one row of features per record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureTable {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }
}

/// Parses CSV text whose first record is the header.
///
/// Short rows are padded with NaN, long rows are rejected, and blank lines
/// are skipped.
pub fn parse_csv(text: &str) -> Result<FeatureTable, PredictError> {
    if text.trim().is_empty() {
        return Err(PredictError::NoColumns);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records().filter(|r| match r {
        Ok(record) => !is_blank(record),
        Err(_) => true,
    });

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(PredictError::NoColumns),
    };
    let columns: Vec<String> = header.iter().map(str::to_string).collect();
    let width = columns.len();

    let mut data = Vec::new();
    let mut n_rows = 0;
    for record in records {
        let record = record?;
        if record.len() > width {
            return Err(PredictError::RaggedRow {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: width,
                saw: record.len(),
            });
        }
        for field in record.iter() {
            data.push(parse_value(field)?);
        }
        data.extend(std::iter::repeat(f64::NAN).take(width - record.len()));
        n_rows += 1;
    }

    let values = Array2::from_shape_vec((n_rows, width), data)?;
    Ok(FeatureTable { columns, values })
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).map_or(true, str::is_empty)
}

fn parse_value(raw: &str) -> Result<f64, PredictError> {
    if NA_TOKENS.contains(&raw) {
        return Ok(f64::NAN);
    }
    if raw.eq_ignore_ascii_case("true") {
        return Ok(1.0);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Ok(0.0);
    }
    raw.parse::<f64>().map_err(|_| PredictError::InvalidValue {
        value: raw.to_string(),
    })
}
