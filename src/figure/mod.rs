//! Explicit figure values
//!
//! A [`Figure`] owns a grid of [`Axes`]; each axes owns the series drawn on
//! it plus its cosmetics (title, ticks, limits, background, legend). Nothing
//! here touches a drawing backend: `render.rs` rasterizes a finished figure and
//! `sink.rs` decides what "showing" it means.
//!
//! Structure:
//! - `palettes.rs`: embedded palette registry
//! - `colors.rs`: per-dimension color assignment and fixed colors
//! - `render.rs`: plotters rasterization to SVG/PNG
//! - `sink.rs`: figure lifecycle (show, then drop)

pub mod colors;
pub mod palettes;
pub mod render;
pub mod sink;

pub use render::{render_svg, render_to_file, OutputFormat};
pub use sink::{FigureSink, FileSink, RecordingSink};

use serde::{Deserialize, Serialize};

/// An RGB color
pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];

/// Scatter marker shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `x`
    Cross,
    /// `o`
    Circle,
    /// `.`
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dotted,
}

/// Where an axes draws its legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    /// No legend
    #[default]
    None,
    /// Upper right corner, over the plotting area
    Inside,
    /// Upper left of a gutter to the right of the plotting area
    Outside,
}

/// Unconnected points
#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub marker: Marker,
    pub color: Rgb,
    pub alpha: f64,
    /// Marker radius in pixels
    pub size: u32,
}

/// Points joined in order
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub width: u32,
    pub style: LineStyle,
}

/// Shaded region between `lower` and `upper`, linearly interpolated between samples
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub label: Option<String>,
    pub xs: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub color: Rgb,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Scatter(Scatter),
    Line(Line),
    Band(Band),
}

impl Series {
    pub fn label(&self) -> Option<&str> {
        match self {
            Series::Scatter(s) => s.label.as_deref(),
            Series::Line(l) => l.label.as_deref(),
            Series::Band(b) => b.label.as_deref(),
        }
    }

    /// All finite `(x, y)` coordinates this series touches
    fn coordinates(&self) -> Vec<(f64, f64)> {
        let coords: Vec<(f64, f64)> = match self {
            Series::Scatter(s) => s.points.clone(),
            Series::Line(l) => l.points.clone(),
            Series::Band(b) => b
                .xs
                .iter()
                .zip(&b.lower)
                .chain(b.xs.iter().zip(&b.upper))
                .map(|(&x, &y)| (x, y))
                .collect(),
        };
        coords
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect()
    }
}

/// One plotting area and everything drawn on it
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub series: Vec<Series>,
    pub title: Option<String>,
    pub x_ticks: Option<Vec<f64>>,
    pub y_ticks: Option<Vec<f64>>,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub background: Rgb,
    pub legend: LegendPosition,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            series: Vec::new(),
            title: None,
            x_ticks: None,
            y_ticks: None,
            x_limits: None,
            y_limits: None,
            background: WHITE,
            legend: LegendPosition::None,
        }
    }
}

/// Fraction of the data span added on each side when limits are not fixed
const AUTO_MARGIN: f64 = 0.05;

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scatter(&mut self, scatter: Scatter) -> &mut Self {
        self.series.push(Series::Scatter(scatter));
        self
    }

    pub fn plot(&mut self, line: Line) -> &mut Self {
        self.series.push(Series::Line(line));
        self
    }

    pub fn fill_between(&mut self, band: Band) -> &mut Self {
        self.series.push(Series::Band(band));
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_xticks(&mut self, ticks: &[f64]) -> &mut Self {
        self.x_ticks = Some(ticks.to_vec());
        self
    }

    pub fn set_yticks(&mut self, ticks: &[f64]) -> &mut Self {
        self.y_ticks = Some(ticks.to_vec());
        self
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) -> &mut Self {
        self.x_limits = Some((lo, hi));
        self
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) -> &mut Self {
        self.y_limits = Some((lo, hi));
        self
    }

    pub fn set_facecolor(&mut self, color: Rgb) -> &mut Self {
        self.background = color;
        self
    }

    pub fn legend(&mut self, position: LegendPosition) -> &mut Self {
        self.legend = position;
        self
    }

    /// Series that carry a label, in drawing order
    pub fn labelled_series(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.series
            .iter()
            .filter_map(|series| series.label().map(|label| (label, series)))
    }

    /// Bounding box of all finite data: `((x_min, x_max), (y_min, y_max))`
    pub fn data_bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut coords = self.series.iter().flat_map(Series::coordinates);
        let (x0, y0) = coords.next()?;
        let bounds = coords.fold(((x0, x0), (y0, y0)), |((xl, xh), (yl, yh)), (x, y)| {
            ((xl.min(x), xh.max(x)), (yl.min(y), yh.max(y)))
        });
        Some(bounds)
    }

    /// Visible x range: fixed limits, else padded data bounds widened to the fixed ticks
    pub fn x_range(&self) -> (f64, f64) {
        self.x_limits.unwrap_or_else(|| {
            let padded = pad(self.data_bounds().map(|(x, _)| x));
            cover_ticks(padded, self.x_ticks.as_deref())
        })
    }

    /// Visible y range: fixed limits, else padded data bounds widened to the fixed ticks
    pub fn y_range(&self) -> (f64, f64) {
        self.y_limits.unwrap_or_else(|| {
            let padded = pad(self.data_bounds().map(|(_, y)| y));
            cover_ticks(padded, self.y_ticks.as_deref())
        })
    }
}

/// Pad data bounds by [`AUTO_MARGIN`]; bounds that cannot be padded without
/// overflowing are returned as they are
fn pad(bounds: Option<(f64, f64)>) -> (f64, f64) {
    let (lo, hi) = match bounds {
        None => return (0.0, 1.0),
        Some(bounds) => bounds,
    };
    let margin = if hi - lo <= f64::EPSILON {
        0.5_f64.max(lo.abs() * AUTO_MARGIN)
    } else {
        (hi - lo) * AUTO_MARGIN
    };
    let padded = (lo - margin, hi + margin);
    if padded.0.is_finite() && padded.1.is_finite() {
        padded
    } else {
        (lo, hi)
    }
}

fn cover_ticks(range: (f64, f64), ticks: Option<&[f64]>) -> (f64, f64) {
    ticks
        .unwrap_or_default()
        .iter()
        .filter(|t| t.is_finite())
        .fold(range, |(lo, hi), &t| (lo.min(t), hi.max(t)))
}

/// A grid of axes with a pixel size and a label used when it is shown
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Width in pixels reserved for [`LegendPosition::Outside`] legends
    pub legend_gutter: u32,
    rows: usize,
    cols: usize,
    axes: Vec<Axes>,
}

impl Figure {
    /// A figure with a single axes
    pub fn new(label: impl Into<String>, size: (u32, u32)) -> Self {
        Self::grid(label, 1, 1, size)
    }

    /// A figure with `rows × cols` empty axes, filled row by row
    pub fn grid(label: impl Into<String>, rows: usize, cols: usize, size: (u32, u32)) -> Self {
        let (rows, cols) = (rows.max(1), cols.max(1));
        Self {
            label: label.into(),
            width: size.0,
            height: size.1,
            legend_gutter: 160,
            rows,
            cols,
            axes: vec![Axes::new(); rows * cols],
        }
    }

    pub fn with_legend_gutter(mut self, width: u32) -> Self {
        self.legend_gutter = width;
        self
    }

    /// `(rows, cols)`
    pub fn layout(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    /// Axes at row-major position `index`
    pub fn axes_mut(&mut self, index: usize) -> Option<&mut Axes> {
        self.axes.get_mut(index)
    }

    /// The first (top-left) axes
    pub fn main_axes_mut(&mut self) -> &mut Axes {
        &mut self.axes[0]
    }
}
