//! Palette registry for loading and accessing color palettes
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name.
//!
//! Palette types:
//! - `categorical`: Discrete colors, one per value dimension
//! - `sequential`: Gradient from low to high, sampled when dimensions outnumber a categorical palette

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

use super::Rgb;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        tracing::error!("Failed to load palettes.json: {}", e);
        PaletteRegistry::default()
    })
});

/// Default categorical palette name
pub const DEFAULT_CATEGORICAL_PALETTE: &str = "bright";

/// Palette type as defined in palettes.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Categorical,
    Sequential,
}

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub palette_type: PaletteType,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index (wraps around)
    pub fn get_color(&self, index: usize) -> Rgb {
        if self.colors.is_empty() {
            return [128, 128, 128];
        }
        let idx = index % self.colors.len();
        parse_hex_color(&self.colors[idx]).unwrap_or([128, 128, 128])
    }

    /// Get the number of colors in this palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Interpolate a color from the palette at position t ∈ [0, 1]
    ///
    /// t=0 returns the first color, t=1 returns the last color.
    pub fn interpolate(&self, t: f64) -> Rgb {
        if self.colors.is_empty() {
            return [128, 128, 128];
        }

        let t = t.clamp(0.0, 1.0);
        let n = self.colors.len();

        if n == 1 {
            return self.get_color(0);
        }

        let pos = t * (n - 1) as f64;
        let idx_low = pos.floor() as usize;
        let idx_high = (idx_low + 1).min(n - 1);
        let frac = pos - idx_low as f64;

        let low = self.get_color(idx_low);
        let high = self.get_color(idx_high);

        let mix = |a: u8, b: u8| (a as f64 * (1.0 - frac) + b as f64 * frac).round() as u8;
        [mix(low[0], high[0]), mix(low[1], high[1]), mix(low[2], high[2])]
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
    categorical_names: Vec<String>,
    sequential_names: Vec<String>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();

        for def in definitions {
            let name = def.name.clone();
            match def.palette_type {
                PaletteType::Categorical => registry.categorical_names.push(name.clone()),
                PaletteType::Sequential => registry.sequential_names.push(name.clone()),
            }
            registry.palettes.insert(name.to_lowercase(), def);
        }

        tracing::debug!(
            total = registry.palettes.len(),
            categorical = registry.categorical_names.len(),
            sequential = registry.sequential_names.len(),
            "Loaded palette registry"
        );

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Get a palette by name only if it has the requested type
    pub fn get_typed(&self, name: &str, palette_type: PaletteType) -> Option<&PaletteDefinition> {
        self.get(name).filter(|p| p.palette_type == palette_type)
    }

    /// Get the default categorical palette
    pub fn default_categorical(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_CATEGORICAL_PALETTE)
    }

    /// List all categorical palette names
    pub fn categorical_palettes(&self) -> &[String] {
        &self.categorical_names
    }

    /// List all sequential palette names
    pub fn sequential_palettes(&self) -> &[String] {
        &self.sequential_names
    }
}

/// Parse a hex color string to RGB array
///
/// Supports `#RRGGBB`, `#RRGGBBAA` (alpha ignored) and both without `#`.
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');

    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        tracing::warn!("Invalid hex color '{}'", hex);
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some([r, g, b])
}
