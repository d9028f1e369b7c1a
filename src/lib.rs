pub mod config;
pub mod error;
pub mod labels;
pub mod model;
pub mod predictor;
pub mod preprocessing;
pub mod server;

#[cfg(test)]
mod fixtures;

// Re-export common types
pub use error::{ErrorKind, PredictError, ServiceError};
pub use predictor::{PredictionReport, Predictor};
