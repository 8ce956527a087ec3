use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse fragments: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fragment {fragment} is malformed: {reason}")]
    InvalidFragment { fragment: usize, reason: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("invalid CSV output: {0}")]
    InvalidOutput(String),
}
