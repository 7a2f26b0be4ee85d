//! Harness errors.

use rfml_core::RfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Simulator error: {0}")]
    Rf(#[from] RfError),

    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
