//! Batch prediction plots
//!
//! Both batch renderers share one pipeline:
//! 1. Validate shapes (which check depends on the value layout)
//! 2. Pick one color per value dimension
//! 3. Build the query grid between per-batch target extrema
//! 4. Invoke the model once for all batches
//! 5. Build one figure per selected batch and show it on the sink
//!
//! The N-D renderer draws every value dimension in its own palette color.
//! The 1-D renderer insists on a single value dimension and uses fixed colors.

use std::fmt::Display;

use ndarray::{s, Array3, ArrayView1, ArrayView3};
use tracing::{debug, info};

use crate::config::PlotConfig;
use crate::data::{
    model::invoke,
    query_grid,
    shapes::{check_consistency, check_feature_dims, check_plot_batch, check_scalar_values},
    BatchData, ModelInputs, Prediction, PredictiveModel,
};
use crate::error::Result;
use crate::figure::colors::{
    dimension_colors, CONTEXT_COLOR, PREDICTION_COLOR, TARGET_COLOR,
};
use crate::figure::palettes::PaletteDefinition;
use crate::figure::{Axes, Band, Figure, FigureSink, Marker, Rgb, Scatter};

/// Per-call options for the batch renderers
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Shown in every figure title as `Epoch {epoch_title}, Batch {n}`
    pub epoch_title: String,
    /// Batch indices to render, in order; `None` renders every batch
    pub plot_batch: Option<Vec<usize>>,
    /// Query points per dimension; `None` uses the configured default
    pub n_points: Option<usize>,
}

impl PlotOptions {
    pub fn new(epoch_title: impl Display) -> Self {
        Self {
            epoch_title: epoch_title.to_string(),
            plot_batch: None,
            n_points: None,
        }
    }

    pub fn plot_batch(mut self, indices: impl Into<Vec<usize>>) -> Self {
        self.plot_batch = Some(indices.into());
        self
    }

    pub fn n_points(mut self, n_points: usize) -> Self {
        self.n_points = Some(n_points);
        self
    }
}

/// How values are laid out across the trailing dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueLayout {
    /// Any number of value dimensions, one palette color each
    PerDimension,
    /// Exactly one value dimension, fixed colors
    Scalar,
}

/// Colors, markers and labels for one value dimension of one batch
#[derive(Debug, Clone)]
struct DimensionStyle {
    target_label: String,
    context_label: String,
    pred_label: String,
    target_color: Rgb,
    context_color: Rgb,
    pred_color: Rgb,
    band_color: Rgb,
    target_marker: Marker,
    context_marker: Marker,
    pred_marker: Marker,
}

impl DimensionStyle {
    fn per_dimension(dim: usize, color: Rgb) -> Self {
        Self {
            target_label: format!("t_{}", dim),
            context_label: format!("c_{}", dim),
            pred_label: format!("pred_{}", dim),
            target_color: color,
            context_color: color,
            pred_color: color,
            band_color: color,
            target_marker: Marker::Cross,
            context_marker: Marker::Circle,
            pred_marker: Marker::Point,
        }
    }

    fn scalar() -> Self {
        Self {
            target_label: "target".to_string(),
            context_label: "context".to_string(),
            pred_label: "pred".to_string(),
            target_color: TARGET_COLOR,
            context_color: CONTEXT_COLOR,
            pred_color: PREDICTION_COLOR,
            band_color: PREDICTION_COLOR,
            target_marker: Marker::Circle,
            context_marker: Marker::Circle,
            pred_marker: Marker::Circle,
        }
    }
}

/// Renders batches of model predictions against context and target sets
#[derive(Debug, Clone)]
pub struct PredictionPlotter {
    config: PlotConfig,
    palette: &'static PaletteDefinition,
}

impl PredictionPlotter {
    /// Validate `config` and resolve its palette
    pub fn new(config: PlotConfig) -> Result<Self> {
        config.validate()?;
        let palette = config.palette_definition()?;
        Ok(Self { config, palette })
    }

    /// Plot every value dimension of each selected batch in its own color
    ///
    /// Fails with [`PlotError::DimensionMismatch`](crate::error::PlotError::DimensionMismatch)
    /// before the model is invoked when `context_x` and `context_y` disagree on
    /// their trailing dimension.
    pub fn plot_predictions_nd<M, S>(
        &self,
        model: &M,
        data: &BatchData<'_>,
        options: &PlotOptions,
        sink: &mut S,
    ) -> Result<()>
    where
        M: PredictiveModel + ?Sized,
        S: FigureSink + ?Sized,
    {
        let value_dim = check_feature_dims(data)?;
        self.render(ValueLayout::PerDimension, value_dim, model, data, options, sink)
    }

    /// Plot single-value-dimension batches with fixed target/context/prediction colors
    ///
    /// Fails with [`PlotError::InvalidShape`](crate::error::PlotError::InvalidShape),
    /// listing all four shapes, when any input has a trailing dimension other than 1.
    pub fn plot_predictions<M, S>(
        &self,
        model: &M,
        data: &BatchData<'_>,
        options: &PlotOptions,
        sink: &mut S,
    ) -> Result<()>
    where
        M: PredictiveModel + ?Sized,
        S: FigureSink + ?Sized,
    {
        check_scalar_values(data)?;
        self.render(ValueLayout::Scalar, 1, model, data, options, sink)
    }

    fn render<M, S>(
        &self,
        layout: ValueLayout,
        value_dim: usize,
        model: &M,
        data: &BatchData<'_>,
        options: &PlotOptions,
        sink: &mut S,
    ) -> Result<()>
    where
        M: PredictiveModel + ?Sized,
        S: FigureSink + ?Sized,
    {
        check_consistency(data, value_dim)?;

        let batches = data.n_batches();
        let plot_batch: Vec<usize> = options
            .plot_batch
            .clone()
            .unwrap_or_else(|| (0..batches).collect());
        check_plot_batch(&plot_batch, batches)?;

        let styles: Vec<DimensionStyle> = match layout {
            ValueLayout::PerDimension => {
                dimension_colors(value_dim, self.palette, &self.config.colormap)?
                    .into_iter()
                    .enumerate()
                    .map(|(dim, color)| DimensionStyle::per_dimension(dim, color))
                    .collect()
            }
            ValueLayout::Scalar => vec![DimensionStyle::scalar()],
        };

        let n_points = options.n_points.unwrap_or(self.config.n_points);
        let x_test = query_grid(data.target_x, n_points)?;

        let inputs = ModelInputs {
            context_x: data.context_x.reborrow(),
            context_y: data.context_y.reborrow(),
            query_x: x_test.view(),
        };
        let prediction = invoke(model, &inputs)?;

        info!(
            ?layout,
            batches,
            value_dim,
            n_points,
            figures = plot_batch.len(),
            "Rendering prediction figures"
        );

        for &batch_num in &plot_batch {
            let title = format!("Epoch {}, Batch {}", options.epoch_title, batch_num);
            let mut figure = Figure::new(title.clone(), self.config.size())
                .with_legend_gutter(self.config.legend_width);

            let axes = figure.main_axes_mut();
            for (dim, style) in styles.iter().enumerate() {
                self.draw_dimension(axes, data, &x_test, &prediction, batch_num, dim, style);
            }
            axes.legend(self.config.legend_position).set_title(title);

            sink.show(figure)?;
            debug!(batch = batch_num, "Figure shown");
        }

        Ok(())
    }

    /// Targets, context, predicted mean and ±1 std band for one dimension of one batch
    #[allow(clippy::too_many_arguments)]
    fn draw_dimension(
        &self,
        axes: &mut Axes,
        data: &BatchData<'_>,
        x_test: &Array3<f64>,
        prediction: &Prediction,
        batch: usize,
        dim: usize,
        style: &DimensionStyle,
    ) {
        let size = self.config.marker_size;
        let alpha = self.config.point_alpha;

        let grid = x_test.slice(s![batch, .., dim]);
        let mean = prediction.mean.slice(s![batch, .., dim]);
        let std = prediction.std.slice(s![batch, .., dim]);

        axes.scatter(Scatter {
            label: Some(style.target_label.clone()),
            points: lane_points(&data.target_x, &data.target_y, batch, dim),
            marker: style.target_marker,
            color: style.target_color,
            alpha,
            size,
        })
        .scatter(Scatter {
            label: Some(style.context_label.clone()),
            points: lane_points(&data.context_x, &data.context_y, batch, dim),
            marker: style.context_marker,
            color: style.context_color,
            alpha,
            size,
        })
        .scatter(Scatter {
            label: Some(style.pred_label.clone()),
            points: zip_points(grid, mean),
            marker: style.pred_marker,
            color: style.pred_color,
            alpha,
            size,
        })
        .fill_between(Band {
            label: None,
            xs: grid.to_vec(),
            lower: mean.iter().zip(std.iter()).map(|(m, s)| m - s).collect(),
            upper: mean.iter().zip(std.iter()).map(|(m, s)| m + s).collect(),
            color: style.band_color,
            alpha: self.config.band_alpha,
        });
    }
}

fn zip_points(xs: ArrayView1<'_, f64>, ys: ArrayView1<'_, f64>) -> Vec<(f64, f64)> {
    xs.iter().copied().zip(ys.iter().copied()).collect()
}

fn lane_points(
    xs: &ArrayView3<'_, f64>,
    ys: &ArrayView3<'_, f64>,
    batch: usize,
    dim: usize,
) -> Vec<(f64, f64)> {
    zip_points(xs.slice(s![batch, .., dim]), ys.slice(s![batch, .., dim]))
}

/// [`PredictionPlotter::plot_predictions_nd`] with the default configuration
pub fn plot_predictions_nd<M, S>(
    model: &M,
    data: &BatchData<'_>,
    options: &PlotOptions,
    sink: &mut S,
) -> Result<()>
where
    M: PredictiveModel + ?Sized,
    S: FigureSink + ?Sized,
{
    PredictionPlotter::new(PlotConfig::default())?.plot_predictions_nd(model, data, options, sink)
}

/// [`PredictionPlotter::plot_predictions`] with the default configuration
pub fn plot_predictions<M, S>(
    model: &M,
    data: &BatchData<'_>,
    options: &PlotOptions,
    sink: &mut S,
) -> Result<()>
where
    M: PredictiveModel + ?Sized,
    S: FigureSink + ?Sized,
{
    PredictionPlotter::new(PlotConfig::default())?.plot_predictions(model, data, options, sink)
}
