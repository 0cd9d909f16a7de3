//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single cluster CSV cannot be extracted.
///
/// These never abort a batch: the extractor folds them into an empty
/// extraction and the file is counted as an error file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("cannot read file: {0}")]
    Unreadable(String),

    #[error("missing metadata line {line} ({field})")]
    MissingMetadata { line: usize, field: &'static str },

    #[error("invalid cluster_size: {0:?}")]
    InvalidClusterSize(String),

    #[error("invalid column header: {0}")]
    Header(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("invalid search volume {value:?} in row {row}")]
    InvalidSearchVolume { row: usize, value: String },

    #[error("cannot hash extraction: {0}")]
    Integrity(String),
}

/// Domain errors represent violations of the taxonomy contract.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("no CSV files found in {0}")]
    NoClusterFiles(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}
