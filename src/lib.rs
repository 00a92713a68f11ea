//! Prediction plots for neural-process style regression models
//!
//! Three renderers, differing by how many value dimensions they expect:
//! - [`plot_functions`]: one already-sliced batch element drawn on a caller-owned [`Axes`]
//! - [`plot_predictions_nd`]: full batches, one color per value dimension
//! - [`plot_predictions`]: full batches with exactly one value dimension
//!
//! The batch renderers build a query grid between the target extrema, call the
//! [`PredictiveModel`] once, and hand one [`Figure`] per batch to a [`FigureSink`].

pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod pipeline;
pub mod single;

pub use config::PlotConfig;
pub use data::{BatchData, ModelInputs, Prediction, PredictiveModel};
pub use error::{PlotError, Result};
pub use figure::{Axes, Figure, FigureSink, FileSink, OutputFormat, RecordingSink};
pub use pipeline::{plot_predictions, plot_predictions_nd, PlotOptions, PredictionPlotter};
pub use single::plot_functions;
