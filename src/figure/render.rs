//! Rasterize [`Figure`] values with plotters
//!
//! Each axes becomes one cartesian chart inside its grid cell. Bands are
//! drawn first so points and lines stay visible on top of them. Legends are
//! drawn by hand so they can live in a gutter outside the plotting area.

use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Axes, Band, Figure, LegendPosition, Line, LineStyle, Marker, Rgb, Scatter, Series};
use crate::error::{PlotError, Result};

/// Image format written by [`render_to_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

const FONT: &str = "sans-serif";
const CAPTION_SIZE: i32 = 22;
const LABEL_SIZE: i32 = 14;
const LEGEND_ROW_HEIGHT: i32 = 20;
const LEGEND_INSIDE_WIDTH: i32 = 140;

/// Upper bound on automatically chosen ticks per axis
const AUTO_TICKS: usize = 10;

fn render_err<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Render a figure to an in-memory SVG document
pub fn render_svg(figure: &Figure) -> Result<String> {
    let mut buffer = String::new();
    {
        let root =
            SVGBackend::with_string(&mut buffer, (figure.width, figure.height)).into_drawing_area();
        draw_figure(&root, figure)?;
        root.present().map_err(render_err)?;
    }
    Ok(buffer)
}

/// Render a figure to `path` in the given format
pub fn render_to_file(figure: &Figure, path: &Path, format: OutputFormat) -> Result<()> {
    let size = (figure.width, figure.height);
    match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().map_err(render_err)?;
        }
        OutputFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().map_err(render_err)?;
        }
    }
    Ok(())
}

/// Draw every axes of `figure` into its grid cell on `root`
pub fn draw_figure<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;

    let panels = root.split_evenly(figure.layout());
    for (panel, axes) in panels.iter().zip(figure.axes()) {
        draw_axes(panel, axes, figure.legend_gutter)?;
    }
    Ok(())
}

fn draw_axes<DB: DrawingBackend>(
    panel: &DrawingArea<DB, Shift>,
    axes: &Axes,
    legend_gutter: u32,
) -> Result<()> {
    panel.fill(&rgb(axes.background)).map_err(render_err)?;

    let has_entries = axes.labelled_series().next().is_some();
    let (panel_width, _) = panel.dim_in_pixel();
    let use_gutter = axes.legend == LegendPosition::Outside
        && has_entries
        && panel_width > legend_gutter.saturating_mul(2);

    let (plot_area, gutter) = if use_gutter {
        let (left, right) = panel.split_horizontally(panel_width - legend_gutter);
        (left, Some(right))
    } else {
        (panel.clone(), None)
    };

    let (x0, x1) = checked_range("x", axes.x_range())?;
    let (y0, y1) = checked_range("y", axes.y_range())?;
    let x_keys = key_points((x0, x1), axes.x_ticks.as_deref());
    let y_keys = key_points((y0, y1), axes.y_ticks.as_deref());

    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(15).x_label_area_size(40).y_label_area_size(50);
    if let Some(title) = &axes.title {
        builder.caption(title, (FONT, CAPTION_SIZE).into_font());
    }
    let mut chart = builder
        .build_cartesian_2d(
            (x0..x1).with_key_points(x_keys),
            (y0..y1).with_key_points(y_keys),
        )
        .map_err(render_err)?;

    let fmt = |v: &f64| tick_label(*v);
    chart
        .configure_mesh()
        .disable_mesh()
        .label_style((FONT, LABEL_SIZE).into_font())
        .x_label_formatter(&fmt)
        .y_label_formatter(&fmt)
        .draw()
        .map_err(render_err)?;

    // Bands underneath everything else
    for series in &axes.series {
        if let Series::Band(band) = series {
            draw_band(&mut chart, band)?;
        }
    }
    for series in &axes.series {
        match series {
            Series::Scatter(scatter) => draw_scatter(&mut chart, scatter)?,
            Series::Line(line) => draw_line(&mut chart, line)?,
            Series::Band(_) => {}
        }
    }

    match (axes.legend, gutter) {
        (LegendPosition::Outside, Some(gutter)) => draw_legend(&gutter, axes, (10, 30))?,
        (LegendPosition::Inside, _) => {
            let (w, _) = plot_area.dim_in_pixel();
            let origin = (w as i32 - LEGEND_INSIDE_WIDTH, 30);
            draw_legend(&plot_area, axes, origin)?;
        }
        _ => {}
    }

    Ok(())
}

/// Reject ranges plotters cannot map: non-finite, empty, or spanning more than f64 holds
fn checked_range(axis: &str, (lo, hi): (f64, f64)) -> Result<(f64, f64)> {
    if lo.is_finite() && hi.is_finite() && lo < hi && (hi - lo).is_finite() {
        Ok((lo, hi))
    } else {
        Err(PlotError::Render(format!(
            "{} range [{}, {}] cannot be drawn",
            axis, lo, hi
        )))
    }
}

/// Tick positions: the fixed ticks inside the range, else evenly stepped round values
fn key_points((lo, hi): (f64, f64), ticks: Option<&[f64]>) -> Vec<f64> {
    match ticks {
        Some(ticks) => ticks
            .iter()
            .copied()
            .filter(|t| (lo..=hi).contains(t))
            .collect(),
        None => nice_ticks(lo, hi, AUTO_TICKS),
    }
}

/// Multiples of a 1/2/5 × 10^k step within `[lo, hi]`, at most `max + 1` of them
fn nice_ticks(lo: f64, hi: f64, max: usize) -> Vec<f64> {
    let raw = (hi - lo) / max.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n <= 1.0 => magnitude,
        n if n <= 2.0 => 2.0 * magnitude,
        n if n <= 5.0 => 5.0 * magnitude,
        _ => 10.0 * magnitude,
    };
    if !(step.is_finite() && step > 0.0) {
        return vec![lo, hi];
    }

    let first = (lo / step).ceil();
    (0..=max)
        .map(|k| (first + k as f64) * step)
        .take_while(|&v| v <= hi)
        .collect()
}

/// Short decimal label; scientific notation for very large or very small values
fn tick_label(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 {
        "0".to_string()
    } else if !(1e-4..1e6).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        format!("{:.6}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

type KeyedAxis = WithKeyPoints<RangedCoordf64>;
type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<KeyedAxis, KeyedAxis>>;

fn draw_scatter<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, scatter: &Scatter) -> Result<()> {
    let color = rgb(scatter.color).mix(scatter.alpha);
    let size = scatter.size as i32;
    let points = scatter.points.iter().copied();
    let drawn = match scatter.marker {
        Marker::Cross => chart
            .draw_series(points.map(|p| Cross::new(p, size, color.stroke_width(1))))
            .map(|_| ()),
        Marker::Circle => chart
            .draw_series(points.map(|p| Circle::new(p, size, color.filled())))
            .map(|_| ()),
        Marker::Point => chart
            .draw_series(points.map(|p| Circle::new(p, (size / 2).max(1), color.filled())))
            .map(|_| ()),
    };
    drawn.map_err(render_err)
}

fn draw_line<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, line: &Line) -> Result<()> {
    let style = rgb(line.color).stroke_width(line.width);
    let points = line.points.iter().copied();
    let drawn = match line.style {
        LineStyle::Solid => chart.draw_series(LineSeries::new(points, style)).map(|_| ()),
        LineStyle::Dotted => chart
            .draw_series(DashedLineSeries::new(points, 2, 4, style))
            .map(|_| ()),
    };
    drawn.map_err(render_err)
}

fn draw_band<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, band: &Band) -> Result<()> {
    let mut outline: Vec<(f64, f64)> = band
        .xs
        .iter()
        .copied()
        .zip(band.upper.iter().copied())
        .collect();
    let lower: Vec<(f64, f64)> = band
        .xs
        .iter()
        .copied()
        .zip(band.lower.iter().copied())
        .collect();
    outline.extend(lower.into_iter().rev());

    let style = rgb(band.color).mix(band.alpha).filled();
    chart
        .draw_series(std::iter::once(Polygon::new(outline, style)))
        .map_err(render_err)?;
    Ok(())
}

/// Legend rows: a glyph in the series' style followed by its label
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    axes: &Axes,
    origin: (i32, i32),
) -> Result<()> {
    let (x, top) = origin;
    for (row, (label, series)) in axes.labelled_series().enumerate() {
        let y = top + row as i32 * LEGEND_ROW_HEIGHT;
        let glyph = (x + 8, y);
        let drawn = match series {
            Series::Scatter(s) => {
                let color = rgb(s.color).mix(s.alpha.max(0.5));
                let size = (s.size as i32).clamp(2, 5);
                match s.marker {
                    Marker::Cross => area.draw(&Cross::new(glyph, size, color.stroke_width(1))),
                    Marker::Circle => area.draw(&Circle::new(glyph, size, color.filled())),
                    Marker::Point => area.draw(&Circle::new(glyph, 2, color.filled())),
                }
            }
            Series::Line(l) => area.draw(&PathElement::new(
                vec![(x, y), (x + 16, y)],
                rgb(l.color).stroke_width(l.width),
            )),
            Series::Band(b) => area.draw(&Rectangle::new(
                [(x, y - 5), (x + 16, y + 5)],
                rgb(b.color).mix(b.alpha.max(0.2)).filled(),
            )),
        };
        drawn.map_err(render_err)?;

        area.draw(&Text::new(
            label.to_string(),
            (x + 24, y - LABEL_SIZE / 2),
            (FONT, LABEL_SIZE).into_font(),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::figure::{Axes, Figure};

    /// Render to SVG, or `None` when the machine has no usable fonts
    pub(crate) fn svg_or_skip(figure: &Figure) -> Option<String> {
        match render_svg(figure) {
            Err(PlotError::Render(message)) if message.to_lowercase().contains("font") => {
                eprintln!("skipping rasterization: {}", message);
                None
            }
            other => Some(other.unwrap()),
        }
    }

    /// Contents of every non-empty `<text>` element
    pub(crate) fn text_labels(svg: &str) -> Vec<String> {
        svg.split("<text")
            .skip(1)
            .filter_map(|chunk| {
                let start = chunk.find('>')? + 1;
                let end = chunk.find("</text>")?;
                chunk.get(start..end).map(str::to_string)
            })
            .filter(|label| !label.is_empty())
            .collect()
    }

    #[test]
    fn test_tick_label() {
        assert_eq!(tick_label(1.5), "1.5");
        assert_eq!(tick_label(2.0), "2");
        assert_eq!(tick_label(-2.0), "-2");
        assert_eq!(tick_label(0.25), "0.25");
        assert_eq!(tick_label(-0.0), "0");
        assert_eq!(tick_label(0.30000000000000004), "0.3");
        assert_eq!(tick_label(2e307), "2e307");
    }

    #[test]
    fn test_fixed_ticks_are_the_key_points() {
        let ticks = [-2.0, 0.0, 2.0];
        assert_eq!(key_points((-2.0, 2.0), Some(&ticks)), vec![-2.0, 0.0, 2.0]);
        assert_eq!(key_points((-1.0, 3.0), Some(&ticks)), vec![0.0, 2.0]);
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 10), (0..=10).map(f64::from).collect::<Vec<_>>());
        let tenths: Vec<f64> = nice_ticks(-0.55, 0.55, 10)
            .into_iter()
            .map(|t| (t * 10.0).round() / 10.0)
            .collect();
        assert_eq!(tenths, vec![-0.4, -0.2, 0.0, 0.2, 0.4]);

        let huge = nice_ticks(-1.5e307, 1.5e307, 10);
        assert!(!huge.is_empty() && huge.len() <= 11);
        assert!(huge.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_unbounded_ranges_are_rejected() {
        assert!(checked_range("x", (-1.0, 1.0)).is_ok());
        assert!(checked_range("x", (f64::NEG_INFINITY, 1.0)).is_err());
        assert!(checked_range("x", (f64::NAN, 1.0)).is_err());
        assert!(checked_range("x", (1.0, 1.0)).is_err());
        assert!(checked_range("x", (-1e308, 1e308)).is_err());
    }

    #[test]
    fn test_overflowing_span_is_an_error_not_a_hang() {
        let mut figure = Figure::new("wide", (320, 240));
        figure.main_axes_mut().scatter(Scatter {
            label: None,
            points: vec![(-1e308, 0.0), (1e308, 0.0)],
            marker: Marker::Point,
            color: [0, 0, 0],
            alpha: 1.0,
            size: 2,
        });

        let err = render_svg(&figure).unwrap_err();
        assert!(matches!(err, PlotError::Render(_)));
        assert!(err.to_string().contains("x range"));
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Svg.extension(), "svg");
        assert_eq!(OutputFormat::Png.extension(), "png");
    }

    #[test]
    fn test_render_svg_produces_document() {
        let mut figure = Figure::new("Epoch 1, Batch 0", (640, 480));
        let axes: &mut Axes = figure.main_axes_mut();
        axes.set_title("Epoch 1, Batch 0")
            .legend(LegendPosition::Outside)
            .scatter(Scatter {
                label: Some("target".to_string()),
                points: vec![(0.0, 0.0), (1.0, 1.0)],
                marker: Marker::Cross,
                color: [255, 0, 0],
                alpha: 0.5,
                size: 4,
            })
            .plot(Line {
                label: Some("truth".to_string()),
                points: vec![(0.0, 1.0), (1.0, 0.0)],
                color: [0, 0, 0],
                width: 2,
                style: LineStyle::Dotted,
            })
            .fill_between(Band {
                label: None,
                xs: vec![0.0, 1.0],
                lower: vec![-0.2, 0.8],
                upper: vec![0.2, 1.2],
                color: [101, 201, 247],
                alpha: 0.2,
            });

        let Some(svg) = svg_or_skip(&figure) else { return };
        assert!(svg.contains("<svg"));
        let labels = text_labels(&svg);
        assert!(labels.iter().any(|l| l == "target"));
        assert!(labels.iter().any(|l| l == "truth"));
        assert!(svg.contains("<polygon"));
    }
}
