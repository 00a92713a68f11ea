//! Query-grid construction
//!
//! For every batch and every value dimension the grid holds `n_points`
//! evenly spaced values between the minimum and maximum of `target_x` along
//! the point axis. Both endpoints are included exactly.

use ndarray::{Array3, ArrayView3, Axis};

use crate::error::{PlotError, Result};

/// `n` evenly spaced values from `start` to `end`, inclusive
///
/// `n == 1` yields `[start]`, `n == 0` yields nothing. Values are blended as
/// `start * (1 - t) + end * t`, so both endpoints are exact and the result
/// stays finite even when `end - start` overflows.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let t = i as f64 / last;
                    start * (1.0 - t) + end * t
                })
                .collect()
        }
    }
}

/// Per-batch, per-dimension `(min, max)` of `target_x` along the point axis
fn extrema(target_x: ArrayView3<'_, f64>) -> Result<Vec<Vec<(f64, f64)>>> {
    target_x
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(batch, points)| {
            if points.len_of(Axis(0)) == 0 {
                return Err(PlotError::EmptyTargets { batch });
            }
            Ok(points
                .axis_iter(Axis(1))
                .map(|lane| {
                    lane.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    })
                })
                .collect())
        })
        .collect()
}

/// Build the `[batch, n_points, value_dim]` query grid for `target_x`
pub fn query_grid(target_x: ArrayView3<'_, f64>, n_points: usize) -> Result<Array3<f64>> {
    let (batches, _, value_dim) = target_x.dim();
    let ranges = extrema(target_x)?;

    let mut grid = Array3::zeros((batches, n_points, value_dim));
    for (batch, dims) in ranges.iter().enumerate() {
        for (dim, &(lo, hi)) in dims.iter().enumerate() {
            for (point, value) in linspace(lo, hi, n_points).into_iter().enumerate() {
                grid[[batch, point, dim]] = value;
            }
        }
    }

    tracing::debug!(batches, n_points, value_dim, "Built query grid");
    Ok(grid)
}
