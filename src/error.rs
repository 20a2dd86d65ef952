//! Error types and result utilities for plotting operations.

use thiserror::Error;

/// Convenience type alias for results that may contain ScPlotError
pub type ScPlotResult<T> = Result<T, ScPlotError>;

/// Error types that can occur while assembling plots from an annotated matrix.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScPlotError {
    /// Raw data was requested but the annotated matrix does not carry a raw alternate.
    #[error("Raw data not found")]
    MissingRaw,

    /// A requested feature exists conceptually but is not supported yet.
    ///
    /// Raised when coloring a scatter matrix by a variable.
    #[error("Not yet implemented: {0}")]
    NotImplemented(String),

    /// A key named neither a variable nor an observation field.
    #[error("Field not found: '{0}' is neither a variable name nor an observation field")]
    FieldNotFound(String),

    /// No coordinates were stored for the requested embedding basis.
    #[error("Embedding not found: no coordinates stored under '{0}'")]
    EmbeddingNotFound(String),

    /// Error that occurs when array dimensions don't match expected values.
    ///
    /// This happens when metadata rows don't line up with matrix rows, etc.
    #[error("Dimension mismatch error: {0}")]
    DimensionMismatch(String),

    /// Error that occurs when invalid parameters are provided to an operation.
    ///
    /// This includes empty key lists, zero grid columns, unknown colormaps, etc.
    #[error("Invalid parameter error: {0}")]
    InvalidParameter(String),

    /// The renderer could not turn the composed figure into its output form.
    #[error("Plotting error: {0}")]
    Plotting(String),
}

impl ScPlotError {
    /// Create an invalid parameter error naming the offending parameter.
    pub fn invalid_parameter(param: &str, reason: impl std::fmt::Display) -> Self {
        ScPlotError::InvalidParameter(format!("{param}: {reason}"))
    }
}
