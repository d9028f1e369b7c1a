pub mod csv;

pub use self::csv::{parse_csv, FeatureTable};
