//! Error types for the yamlfix surfaces.
//!
//! The engine itself never fails: defects are reported as data. These
//! errors cover what sits around it (file access, configuration, request
//! decoding).

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for the CLI, config loading and the JSON service.
#[derive(Debug, Error)]
pub enum YamlfixError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed JSON request or unserializable response
    #[error("Invalid request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while loading `.yamlfix.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for surface operations
pub type Result<T> = std::result::Result<T, YamlfixError>;
