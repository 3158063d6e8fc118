//! Error type shared by the loader, the filter engine and the configuration layer.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::City;

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("unknown city '{0}' (expected chicago, new york city or washington)")]
    InvalidCity(String),

    #[error("invalid {axis} filter '{value}'")]
    InvalidFilter { axis: &'static str, value: String },

    #[error("malformed record at line {line}: {field} '{value}' could not be parsed")]
    MalformedRecord {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("{city} does not provide gender and birth year data")]
    UnsupportedForDataset { city: City },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExploreError>;
