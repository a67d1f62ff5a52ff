//! Error types for natalprobe

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NatalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No value configured for {0} (checked environment and secrets store)")]
    MissingSecret(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Status {
        service: String,
        status: reqwest::StatusCode,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Region data error: {0}")]
    RegionData(String),

    #[error("Chart response error: {0}")]
    ChartResponse(String),

    #[error("LLM provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, NatalError>;
