use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid period kind '{kind}': {reason}")]
    InvalidPeriodKind { kind: String, reason: String },

    #[error("Invalid window: {reason}")]
    InvalidWindow { reason: String },

    #[error("Unknown timezone: {name}")]
    UnknownTimezone { name: String },

    #[error("Record source failed: {reason}")]
    Source { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
