//! Error types for the sarima-evolve library.

use thiserror::Error;

/// Result type alias for model fitting and forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while fitting or forecasting a single model.
///
/// Inside a search these never reach the caller: the cost functions turn
/// any of them into the sentinel cost.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// The likelihood optimiser stopped without converging.
    #[error("estimation did not converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

/// Result type alias for search-level operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors surfaced to the caller of a search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The search configuration was rejected before any evaluation ran.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// Every evaluated candidate scored the sentinel cost.
    #[error("no viable model found after {generations} generations ({evaluations} evaluations)")]
    SearchExhausted {
        generations: usize,
        evaluations: usize,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    /// Fitting or forecasting failed outside the search loop.
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}
