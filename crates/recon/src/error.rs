use std::fmt;

use thiserror::Error;

/// A required input that was not supplied to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingInput {
    pub input: String,
    pub file: String,
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file, self.input)
    }
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (no locations, bad buffer rate, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// One or more required tables were not provided. Every item is listed.
    #[error("{} required input(s) missing: {}", .0.len(), join_missing(.0))]
    MissingInputs(Vec<MissingInput>),
    /// Missing required column in an input table.
    #[error("input '{input}': missing column '{column}'")]
    MissingColumn { input: String, column: String },
    /// Date parse error.
    #[error("input '{input}', row {row}: cannot parse date '{value}'")]
    DateParse { input: String, row: usize, value: String },
    /// Quantity parse error.
    #[error("input '{input}', row {row}: cannot parse quantity '{value}'")]
    QuantityParse { input: String, row: usize, value: String },
}

fn join_missing(items: &[MissingInput]) -> String {
    items
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
