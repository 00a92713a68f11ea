//! Single-batch function plot
//!
//! Draws one already-sliced batch element onto an axes the caller owns, so
//! several of them can share a grid figure.

use ndarray::ArrayView2;

use crate::figure::colors::{MEAN_LINE_COLOR, TRUTH_LINE_COLOR, UNCERTAINTY_FILL};
use crate::figure::{Axes, Band, Line, LineStyle, Marker, Scatter, WHITE};

const TICKS: [f64; 3] = [-2.0, 0.0, 2.0];
const Y_LIMITS: (f64, f64) = (-2.0, 2.0);

/// First column of a `[n_points, value_dim]` view; empty rows are skipped
fn first_column(values: ArrayView2<'_, f64>) -> Vec<f64> {
    values
        .rows()
        .into_iter()
        .filter_map(|row| row.get(0).copied())
        .collect()
}

fn zip(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter().copied().zip(ys.iter().copied()).collect()
}

/// Plot predicted mean, ground truth, context points and the ±1 std band
///
/// Every view is `[n_points, 1]`; `pred_y` and `std` are sampled at
/// `target_x`. Shapes are not validated and only the first column of each
/// view is read. Ticks are fixed to `-2, 0, 2` on both axes and the y range
/// to `[-2, 2]`.
pub fn plot_functions<'a>(
    axes: &'a mut Axes,
    target_x: ArrayView2<'_, f64>,
    target_y: ArrayView2<'_, f64>,
    context_x: ArrayView2<'_, f64>,
    context_y: ArrayView2<'_, f64>,
    pred_y: ArrayView2<'_, f64>,
    std: ArrayView2<'_, f64>,
) -> &'a mut Axes {
    let xs = first_column(target_x);
    let truth = first_column(target_y);
    let mean = first_column(pred_y);
    let spread = first_column(std);

    let lower: Vec<f64> = mean.iter().zip(&spread).map(|(m, s)| m - s).collect();
    let upper: Vec<f64> = mean.iter().zip(&spread).map(|(m, s)| m + s).collect();

    axes.plot(Line {
        label: Some("pred".to_string()),
        points: zip(&xs, &mean),
        color: MEAN_LINE_COLOR,
        width: 2,
        style: LineStyle::Solid,
    })
    .plot(Line {
        label: Some("truth".to_string()),
        points: zip(&xs, &truth),
        color: TRUTH_LINE_COLOR,
        width: 2,
        style: LineStyle::Dotted,
    })
    .scatter(Scatter {
        label: Some("context".to_string()),
        points: zip(&first_column(context_x), &first_column(context_y)),
        marker: Marker::Circle,
        color: TRUTH_LINE_COLOR,
        alpha: 1.0,
        size: 5,
    })
    .fill_between(Band {
        label: None,
        xs,
        lower,
        upper,
        color: UNCERTAINTY_FILL,
        alpha: 0.2,
    })
    .set_yticks(&TICKS)
    .set_xticks(&TICKS)
    .set_ylim(Y_LIMITS.0, Y_LIMITS.1)
    .set_facecolor(WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::render::tests::{svg_or_skip, text_labels};
    use crate::figure::{Figure, Series};
    use ndarray::{array, Array2};

    fn column(values: &[f64]) -> Array2<f64> {
        Array2::from_shape_vec((values.len(), 1), values.to_vec()).unwrap()
    }

    #[test]
    fn test_draws_all_four_layers() {
        let target_x = column(&[-1.0, 0.0, 1.0]);
        let target_y = column(&[0.5, 0.0, -0.5]);
        let context_x = column(&[-1.0, 1.0]);
        let context_y = column(&[0.5, -0.5]);
        let pred_y = column(&[0.4, 0.1, -0.6]);
        let std = column(&[0.2, 0.3, 0.1]);

        let mut axes = Axes::new();
        plot_functions(
            &mut axes,
            target_x.view(),
            target_y.view(),
            context_x.view(),
            context_y.view(),
            pred_y.view(),
            std.view(),
        );

        let labels: Vec<&str> = axes.labelled_series().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["pred", "truth", "context"]);

        match &axes.series[0] {
            Series::Line(line) => {
                assert_eq!(line.style, LineStyle::Solid);
                assert_eq!(line.color, MEAN_LINE_COLOR);
                assert_eq!(line.points, vec![(-1.0, 0.4), (0.0, 0.1), (1.0, -0.6)]);
            }
            other => panic!("expected mean line, got {:?}", other),
        }
        match &axes.series[1] {
            Series::Line(line) => assert_eq!(line.style, LineStyle::Dotted),
            other => panic!("expected truth line, got {:?}", other),
        }
        match &axes.series[2] {
            Series::Scatter(scatter) => {
                assert_eq!(scatter.points, vec![(-1.0, 0.5), (1.0, -0.5)]);
                assert_eq!(scatter.marker, Marker::Circle);
            }
            other => panic!("expected context scatter, got {:?}", other),
        }
        match &axes.series[3] {
            Series::Band(band) => {
                assert_eq!(band.xs, vec![-1.0, 0.0, 1.0]);
                assert_eq!(band.color, UNCERTAINTY_FILL);
                assert_eq!(band.alpha, 0.2);
                assert!((band.lower[1] + 0.2).abs() < 1e-12);
                assert!((band.upper[1] - 0.4).abs() < 1e-12);
            }
            other => panic!("expected band, got {:?}", other),
        }
    }

    #[test]
    fn test_fixes_ticks_limits_and_background() {
        let empty = Array2::<f64>::zeros((0, 1));
        let mut axes = Axes::new();
        axes.set_facecolor([10, 10, 10]);

        let axes = plot_functions(
            &mut axes,
            empty.view(),
            empty.view(),
            empty.view(),
            empty.view(),
            empty.view(),
            empty.view(),
        );

        assert_eq!(axes.x_ticks.as_deref(), Some(&TICKS[..]));
        assert_eq!(axes.y_ticks.as_deref(), Some(&TICKS[..]));
        assert_eq!(axes.y_range(), (-2.0, 2.0));
        assert_eq!(axes.background, WHITE);
    }

    #[test]
    fn test_returned_axes_composes_in_a_grid() {
        let xs = array![[-1.0], [1.0]];
        let ys = array![[0.0], [0.0]];
        let mut figure = Figure::grid("panels", 2, 2, (800, 800));

        for index in 0..4 {
            if let Some(axes) = figure.axes_mut(index) {
                plot_functions(
                    axes,
                    xs.view(),
                    ys.view(),
                    xs.view(),
                    ys.view(),
                    ys.view(),
                    ys.view(),
                )
                .set_title(format!("panel {}", index));
            }
        }

        let titles: Vec<Option<&str>> = figure.axes().iter().map(|a| a.title.as_deref()).collect();
        assert_eq!(
            titles,
            vec![Some("panel 0"), Some("panel 1"), Some("panel 2"), Some("panel 3")]
        );
        assert!(figure.axes().iter().all(|a| a.series.len() == 4));
    }

    #[test]
    fn test_rendered_ticks_are_exactly_minus_two_zero_two() {
        let xs = column(&[-1.0, -0.5, 0.0, 0.5, 1.0]);
        let ys = column(&[-1.0, -0.25, 0.0, 0.25, 1.0]);
        let std = column(&[0.1; 5]);
        let mut figure = Figure::new("ticks", (480, 480));
        plot_functions(
            figure.main_axes_mut(),
            xs.view(),
            ys.view(),
            xs.view(),
            ys.view(),
            ys.view(),
            std.view(),
        );

        let Some(svg) = svg_or_skip(&figure) else { return };
        let labels = text_labels(&svg);
        let count = |tick: &str| labels.iter().filter(|l| l.as_str() == tick).count();

        // One of each per axis
        assert_eq!(count("-2"), 2, "labels: {:?}", labels);
        assert_eq!(count("0"), 2, "labels: {:?}", labels);
        assert_eq!(count("2"), 2, "labels: {:?}", labels);
        assert!(!svg.contains("></text>"));
    }

    #[test]
    fn test_only_first_column_is_read() {
        let target_x = array![[0.0, 9.0], [1.0, 9.0]];
        let target_y = array![[1.0, 9.0], [2.0, 9.0]];
        let mut axes = Axes::new();
        plot_functions(
            &mut axes,
            target_x.view(),
            target_y.view(),
            target_x.view(),
            target_y.view(),
            target_y.view(),
            target_y.view(),
        );

        match &axes.series[1] {
            Series::Line(line) => assert_eq!(line.points, vec![(0.0, 1.0), (1.0, 2.0)]),
            other => panic!("expected truth line, got {:?}", other),
        }
    }
}
