//! Error types for the RF channel simulator and localization layer.

use thiserror::Error;

/// Errors raised by scene generation, the measurement engines and the
/// regression layer.
///
/// Every variant is raised before any random draw is made and before any
/// state on an [`RfChannel`](crate::RfChannel) is written.
#[derive(Debug, Error)]
pub enum RfError {
    /// Invalid configuration (extent arity, grid/run mismatch, unknown
    /// enum index, count/scale mismatch, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A supplied matrix or layout does not fit the expected shape
    #[error("Shape error: {0}")]
    Shape(String),

    /// An engine was invoked before any scene was generated
    #[error("No scene generated; call generate_scene first")]
    NoScene,

    /// A propagation parameter was rejected by a distribution constructor
    #[error("Distribution error: {0}")]
    Distribution(String),

    /// A linear system could not be solved
    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl RfError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a shape error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Wraps a `rand_distr` construction error.
    pub fn distribution(err: impl std::fmt::Display) -> Self {
        Self::Distribution(err.to_string())
    }

    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true for shape errors.
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }
}
