//! Shape validation for batched inputs
//!
//! The two renderers differ only in which dimensionality they insist on:
//! the N-D renderer requires `xdim == ydim`, the 1-D renderer requires every
//! trailing dimension to be 1. Both then run the same consistency checks so
//! that malformed batches are rejected before the model is invoked.

use std::fmt;

use super::BatchData;
use crate::error::{PlotError, Result};

/// A 3-D array shape `(batch, points, value_dim)`
pub type Shape3 = (usize, usize, usize);

/// Shapes of the four input arrays, keyed by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeReport {
    pub context_x: Shape3,
    pub context_y: Shape3,
    pub target_x: Shape3,
    pub target_y: Shape3,
}

impl ShapeReport {
    pub fn new(context_x: Shape3, context_y: Shape3, target_x: Shape3, target_y: Shape3) -> Self {
        Self {
            context_x,
            context_y,
            target_x,
            target_y,
        }
    }

    /// Iterate `(name, shape)` pairs in argument order
    pub fn entries(&self) -> [(&'static str, Shape3); 4] {
        [
            ("context_x", self.context_x),
            ("context_y", self.context_y),
            ("target_x", self.target_x),
            ("target_y", self.target_y),
        ]
    }
}

impl fmt::Display for ShapeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, (b, p, d))) in self.entries().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: ({}, {}, {})", name, b, p, d)?;
        }
        write!(f, "}}")
    }
}

/// N-D precondition: input and output feature counts must match
///
/// Returns the shared value dimension.
pub fn check_feature_dims(data: &BatchData<'_>) -> Result<usize> {
    let (xdim, ydim) = (data.xdim(), data.ydim());
    if xdim != ydim {
        return Err(PlotError::DimensionMismatch { xdim, ydim });
    }
    Ok(xdim)
}

/// 1-D precondition: every array carries exactly one value per point
pub fn check_scalar_values(data: &BatchData<'_>) -> Result<()> {
    let report = data.shape_report();
    if report.entries().iter().all(|(_, (_, _, d))| *d == 1) {
        Ok(())
    } else {
        Err(PlotError::InvalidShape(report))
    }
}

/// Cross-array consistency shared by both renderers
///
/// Checks that all four arrays agree on batch count and value dimension, and
/// that each x/y pair agrees on point count.
pub fn check_consistency(data: &BatchData<'_>, value_dim: usize) -> Result<()> {
    let report = data.shape_report();
    let batches = report.target_x.0;

    for (name, (b, _, d)) in report.entries() {
        if b != batches {
            return Err(PlotError::ShapeMismatch(format!(
                "{} has {} batches, target_x has {}",
                name, b, batches
            )));
        }
        if d != value_dim {
            return Err(PlotError::ShapeMismatch(format!(
                "{} has value dimension {}, expected {}",
                name, d, value_dim
            )));
        }
    }

    if report.context_x.1 != report.context_y.1 {
        return Err(PlotError::ShapeMismatch(format!(
            "context_x has {} points but context_y has {}",
            report.context_x.1, report.context_y.1
        )));
    }
    if report.target_x.1 != report.target_y.1 {
        return Err(PlotError::ShapeMismatch(format!(
            "target_x has {} points but target_y has {}",
            report.target_x.1, report.target_y.1
        )));
    }

    Ok(())
}

/// Every requested batch index must exist
pub fn check_plot_batch(indices: &[usize], batches: usize) -> Result<()> {
    match indices.iter().find(|&&index| index >= batches) {
        Some(&index) => Err(PlotError::BatchOutOfRange { index, batches }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn zeros(shape: Shape3) -> Array3<f64> {
        Array3::zeros(shape)
    }

    #[test]
    fn test_shape_report_display_lists_all_four() {
        let report = ShapeReport::new((4, 3, 1), (4, 3, 1), (2, 5, 2), (2, 5, 1));
        assert_eq!(
            report.to_string(),
            "{context_x: (4, 3, 1), context_y: (4, 3, 1), target_x: (2, 5, 2), target_y: (2, 5, 1)}"
        );
    }

    #[test]
    fn test_feature_dim_mismatch_reports_both_values() {
        let cx = zeros((4, 3, 2));
        let cy = zeros((4, 3, 3));
        let tx = zeros((4, 5, 2));
        let ty = zeros((4, 5, 2));
        let data = BatchData::new(cx.view(), cy.view(), tx.view(), ty.view());

        let err = check_feature_dims(&data).unwrap_err();
        assert!(matches!(
            err,
            PlotError::DimensionMismatch { xdim: 2, ydim: 3 }
        ));
        assert_eq!(
            err.to_string(),
            "X and Y dimensions must be equal. Got xdim=2, ydim=3"
        );
    }

    #[test]
    fn test_scalar_check_reports_every_shape() {
        let cx = zeros((2, 3, 1));
        let cy = zeros((2, 3, 1));
        let tx = zeros((2, 5, 2));
        let ty = zeros((2, 5, 1));
        let data = BatchData::new(cx.view(), cy.view(), tx.view(), ty.view());

        let err = check_scalar_values(&data).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("target_x: (2, 5, 2)"));
        assert!(message.contains("context_x: (2, 3, 1)"));
        assert!(message.contains("context_y: (2, 3, 1)"));
        assert!(message.contains("target_y: (2, 5, 1)"));
        assert!(message.ends_with("Expected shape for input arrays is (batches, points, 1)."));
    }

    #[test]
    fn test_consistency_rejects_batch_count_mismatch() {
        let cx = zeros((3, 3, 1));
        let cy = zeros((3, 3, 1));
        let tx = zeros((2, 5, 1));
        let ty = zeros((2, 5, 1));
        let data = BatchData::new(cx.view(), cy.view(), tx.view(), ty.view());

        let err = check_consistency(&data, 1).unwrap_err();
        assert!(err.to_string().contains("context_x has 3 batches"));
    }

    #[test]
    fn test_consistency_rejects_target_dim_mismatch() {
        let cx = zeros((2, 3, 2));
        let cy = zeros((2, 3, 2));
        let tx = zeros((2, 5, 2));
        let ty = zeros((2, 5, 1));
        let data = BatchData::new(cx.view(), cy.view(), tx.view(), ty.view());

        assert!(check_feature_dims(&data).is_ok());
        let err = check_consistency(&data, 2).unwrap_err();
        assert!(err.to_string().contains("target_y has value dimension 1"));
    }

    #[test]
    fn test_consistency_rejects_point_count_mismatch() {
        let cx = zeros((2, 3, 1));
        let cy = zeros((2, 4, 1));
        let tx = zeros((2, 5, 1));
        let ty = zeros((2, 5, 1));
        let data = BatchData::new(cx.view(), cy.view(), tx.view(), ty.view());

        let err = check_consistency(&data, 1).unwrap_err();
        assert!(err.to_string().contains("context_y has 4"));
    }

    #[test]
    fn test_plot_batch_range() {
        assert!(check_plot_batch(&[0, 1, 1], 2).is_ok());
        assert!(check_plot_batch(&[], 0).is_ok());
        assert!(matches!(
            check_plot_batch(&[0, 2], 2),
            Err(PlotError::BatchOutOfRange {
                index: 2,
                batches: 2
            })
        ));
    }
}
