//! Color assignment for value dimensions
//!
//! Each value dimension gets one color. Up to the size of the categorical
//! palette the colors come from that palette in order; beyond it a continuous
//! colormap is sampled at evenly spaced positions in `[0, 1]`.

use super::palettes::{PaletteDefinition, PaletteType, PALETTE_REGISTRY};
use super::Rgb;
use crate::data::linspace;
use crate::error::{PlotError, Result};

/// Built-in analytic colormap used when dimensions outnumber the palette
pub const DEFAULT_COLORMAP: &str = "rainbow";

/// Fixed colors for the single-value-dimension renderer
pub const TARGET_COLOR: Rgb = [255, 0, 0];
pub const CONTEXT_COLOR: Rgb = [0, 0, 255];
pub const PREDICTION_COLOR: Rgb = [0, 0, 0];

/// Colors used by the single-batch function plot
pub const MEAN_LINE_COLOR: Rgb = [0, 0, 255];
pub const TRUTH_LINE_COLOR: Rgb = [0, 0, 0];
pub const UNCERTAINTY_FILL: Rgb = [0x65, 0xc9, 0xf7];

fn to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// The rainbow colormap at t ∈ [0, 1]
///
/// r = |2t - 0.5|, g = sin(πt), b = cos(πt / 2), each clipped to [0, 1].
pub fn rainbow(t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let r = (2.0 * t - 0.5).abs();
    let g = (std::f64::consts::PI * t).sin();
    let b = (std::f64::consts::FRAC_PI_2 * t).cos();
    [to_channel(r), to_channel(g), to_channel(b)]
}

/// Whether `name` refers to a colormap that can be sampled
pub fn is_known_colormap(name: &str) -> bool {
    name.eq_ignore_ascii_case(DEFAULT_COLORMAP)
        || PALETTE_REGISTRY
            .get_typed(name, PaletteType::Sequential)
            .is_some()
}

/// Sample `n` colors from a colormap at evenly spaced positions
pub fn sample_colormap(name: &str, n: usize) -> Result<Vec<Rgb>> {
    let positions = linspace(0.0, 1.0, n);
    if name.eq_ignore_ascii_case(DEFAULT_COLORMAP) {
        return Ok(positions.into_iter().map(rainbow).collect());
    }
    let palette = PALETTE_REGISTRY
        .get_typed(name, PaletteType::Sequential)
        .ok_or_else(|| PlotError::Config(format!("Unknown colormap '{}'", name)))?;
    Ok(positions.into_iter().map(|t| palette.interpolate(t)).collect())
}

/// One color per value dimension
pub fn dimension_colors(
    n_dims: usize,
    palette: &PaletteDefinition,
    colormap: &str,
) -> Result<Vec<Rgb>> {
    if n_dims > palette.len() {
        tracing::debug!(
            n_dims,
            palette = %palette.name,
            colormap,
            "Palette exhausted, sampling colormap"
        );
        return sample_colormap(colormap, n_dims);
    }
    Ok((0..n_dims).map(|dim| palette.get_color(dim)).collect())
}
