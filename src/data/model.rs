//! The predictive-model seam
//!
//! Renderers never look inside a model. They hand it the context set and the
//! query grid and get back a mean and a standard deviation per query point.

use ndarray::{Array3, ArrayView3};

use crate::error::{PlotError, Result};

/// Arguments passed to [`PredictiveModel::predict`]
#[derive(Debug, Clone, Copy)]
pub struct ModelInputs<'a> {
    pub context_x: ArrayView3<'a, f64>,
    pub context_y: ArrayView3<'a, f64>,
    pub query_x: ArrayView3<'a, f64>,
}

/// Predicted mean and standard deviation, shaped like the query grid
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub mean: Array3<f64>,
    pub std: Array3<f64>,
}

/// Anything that can predict `(mean, std)` at query points given a context set
pub trait PredictiveModel {
    fn predict(&self, inputs: &ModelInputs<'_>) -> anyhow::Result<Prediction>;
}

impl<F> PredictiveModel for F
where
    F: Fn(&ModelInputs<'_>) -> anyhow::Result<Prediction>,
{
    fn predict(&self, inputs: &ModelInputs<'_>) -> anyhow::Result<Prediction> {
        self(inputs)
    }
}

/// Call the model once for the whole batch and check the returned shapes
pub fn invoke<M: PredictiveModel + ?Sized>(model: &M, inputs: &ModelInputs<'_>) -> Result<Prediction> {
    let prediction = model.predict(inputs).map_err(PlotError::Model)?;

    let expected = inputs.query_x.dim();
    for (name, got) in [("mean", prediction.mean.dim()), ("std", prediction.std.dim())] {
        if got != expected {
            return Err(PlotError::ShapeMismatch(format!(
                "model returned {} with shape {:?}, expected {:?}",
                name, got, expected
            )));
        }
    }

    tracing::debug!(shape = ?expected, "Model prediction received");
    Ok(prediction)
}
