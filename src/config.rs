//! Plot configuration
//!
//! Every setting has an explicit default in [`PlotConfig::default`]. A JSON
//! document may override any subset of them; missing keys keep their default.
//! Palette and colormap names are checked against the embedded registry when
//! the configuration is loaded, not when the first figure is drawn.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};
use crate::figure::colors::{is_known_colormap, DEFAULT_COLORMAP};
use crate::figure::palettes::{
    PaletteDefinition, PaletteType, DEFAULT_CATEGORICAL_PALETTE, PALETTE_REGISTRY,
};
use crate::figure::{LegendPosition, OutputFormat};

/// Number of query points per dimension when the caller does not ask for one
pub const DEFAULT_N_POINTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Figure width in pixels (including the legend gutter)
    pub width: u32,

    /// Figure height in pixels
    pub height: u32,

    /// Categorical palette used for per-dimension colors
    pub palette: String,

    /// Colormap sampled when dimensions outnumber the palette:
    /// "rainbow" or the name of a sequential palette
    pub colormap: String,

    /// Query points per dimension for the batch renderers
    pub n_points: usize,

    /// Marker radius in pixels for target/context/prediction scatters
    pub marker_size: u32,

    /// Opacity of scattered points
    pub point_alpha: f64,

    /// Opacity of the ±1 std band in the batch renderers
    pub band_alpha: f64,

    /// Legend placement for batch figures
    pub legend_position: LegendPosition,

    /// Width in pixels of the gutter used by outside legends
    pub legend_width: u32,

    /// Image format written by file sinks
    pub output_format: OutputFormat,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 640,
            palette: DEFAULT_CATEGORICAL_PALETTE.to_string(),
            colormap: DEFAULT_COLORMAP.to_string(),
            n_points: DEFAULT_N_POINTS,
            marker_size: 4,
            point_alpha: 0.5,
            band_alpha: 0.1,
            legend_position: LegendPosition::Outside,
            legend_width: 160,
            output_format: OutputFormat::Svg,
        }
    }
}

impl PlotConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        tracing::debug!(?config, "Loaded plot configuration");
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Check sizes, opacities and names
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PlotError::Config(format!(
                "Figure size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.legend_width >= self.width {
            return Err(PlotError::Config(format!(
                "Legend width {} does not fit in figure width {}",
                self.legend_width, self.width
            )));
        }
        for (name, alpha) in [("point_alpha", self.point_alpha), ("band_alpha", self.band_alpha)] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(PlotError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, alpha
                )));
            }
        }
        self.palette_definition()?;
        if !is_known_colormap(&self.colormap) {
            return Err(PlotError::Config(format!(
                "Unknown colormap '{}' (available: {}, {})",
                self.colormap,
                DEFAULT_COLORMAP,
                PALETTE_REGISTRY.sequential_palettes().join(", ")
            )));
        }
        Ok(())
    }

    /// The configured categorical palette
    pub fn palette_definition(&self) -> Result<&'static PaletteDefinition> {
        PALETTE_REGISTRY
            .get_typed(&self.palette, PaletteType::Categorical)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                PlotError::Config(format!(
                    "Unknown categorical palette '{}' (available: {})",
                    self.palette,
                    PALETTE_REGISTRY.categorical_palettes().join(", ")
                ))
            })
    }

    /// `(width, height)` in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
