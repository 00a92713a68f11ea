use thiserror::Error;

use crate::data::ShapeReport;

/// Errors that can occur while building or rendering prediction plots
#[derive(Debug, Error)]
pub enum PlotError {
    /// Input and output feature counts differ (N-D renderer)
    #[error("X and Y dimensions must be equal. Got xdim={xdim}, ydim={ydim}")]
    DimensionMismatch { xdim: usize, ydim: usize },

    /// At least one input has a trailing dimension other than 1 (1-D renderer)
    #[error(
        "All inputs must have 1 dimension for their values. Got shapes: {0}. \
         Expected shape for input arrays is (batches, points, 1)."
    )]
    InvalidShape(ShapeReport),

    /// Arrays disagree on batch count, point count or value dimension
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A requested batch index does not exist
    #[error("Batch index {index} out of range for {batches} batches")]
    BatchOutOfRange { index: usize, batches: usize },

    /// A batch has no target points, so there is no range to interpolate over
    #[error("Batch {batch} has no target points to build a query grid from")]
    EmptyTargets { batch: usize },

    /// The predictive model failed
    #[error("Model prediction failed: {0}")]
    Model(#[source] anyhow::Error),

    /// Rasterization error reported by the drawing backend
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration error (unknown palette, invalid sizes, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results using PlotError
pub type Result<T> = std::result::Result<T, PlotError>;
