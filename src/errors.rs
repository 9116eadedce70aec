use std::path::PathBuf;

use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Required store missing: {}", .0.display())]
    MissingStore(PathBuf),
    #[error("`{0}` is a reserved word and cannot be used as a name")]
    ReservedName(String),
    #[error("Account already exists: `{0}`")]
    DuplicateAccount(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Unknown column: `{0}`")]
    UnknownColumn(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
