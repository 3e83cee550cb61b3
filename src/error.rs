use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// A read that could not produce a value this cycle.
///
/// Readers hand this back instead of propagating the underlying failure so
/// that a broken database degrades to "skip this cycle".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{what} unavailable: {reason}")]
pub struct Unavailable {
    pub what: &'static str,
    pub reason: String,
}

impl Unavailable {
    pub fn new(what: &'static str, reason: impl Into<String>) -> Self {
        Self {
            what,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Unavailable(#[from] Unavailable),

    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("failed to build pool: {0}")]
    PoolBuild(String),

    #[error("{operation} timed out after {}ms", timeout.as_millis())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
