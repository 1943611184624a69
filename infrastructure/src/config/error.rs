//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Cannot read server config {}: {source}", path.display())]
    ServerFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed server config {}: {message}", path.display())]
    ServerFileParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Semantic problems in an otherwise well-formed config
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{field} cannot be 0")]
    ZeroDuration { field: &'static str },

    #[error("estimation.monthly_ceiling must be a positive number")]
    InvalidCeiling,

    #[error("{field} cannot be empty")]
    EmptyName { field: &'static str },
}
