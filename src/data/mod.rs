//! Batched input arrays and the operations performed on them before drawing
//!
//! Structure:
//! - `shapes.rs`: shape validation and the named shape report used in errors
//! - `grid.rs`: query-grid construction (`linspace` between target extrema)
//! - `model.rs`: the predictive-model seam and prediction checks

pub mod grid;
pub mod model;
pub mod shapes;

pub use grid::{linspace, query_grid};
pub use model::{ModelInputs, Prediction, PredictiveModel};
pub use shapes::ShapeReport;

use ndarray::{ArrayView3, Axis};

/// Context and target sets for a whole batch, each shaped `[batch, points, value_dim]`
#[derive(Debug, Clone, Copy)]
pub struct BatchData<'a> {
    pub context_x: ArrayView3<'a, f64>,
    pub context_y: ArrayView3<'a, f64>,
    pub target_x: ArrayView3<'a, f64>,
    pub target_y: ArrayView3<'a, f64>,
}

impl<'a> BatchData<'a> {
    pub fn new(
        context_x: ArrayView3<'a, f64>,
        context_y: ArrayView3<'a, f64>,
        target_x: ArrayView3<'a, f64>,
        target_y: ArrayView3<'a, f64>,
    ) -> Self {
        Self {
            context_x,
            context_y,
            target_x,
            target_y,
        }
    }

    /// Number of batches, taken from `target_x`
    pub fn n_batches(&self) -> usize {
        self.target_x.len_of(Axis(0))
    }

    /// Trailing dimension of `context_x`
    pub fn xdim(&self) -> usize {
        self.context_x.len_of(Axis(2))
    }

    /// Trailing dimension of `context_y`
    pub fn ydim(&self) -> usize {
        self.context_y.len_of(Axis(2))
    }

    /// Shapes of all four arrays, keyed by name
    pub fn shape_report(&self) -> ShapeReport {
        ShapeReport::new(
            self.context_x.dim(),
            self.context_y.dim(),
            self.target_x.dim(),
            self.target_y.dim(),
        )
    }
}
