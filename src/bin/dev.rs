//! np_plots - Development entry point
//!
//! Synthesizes sinusoidal batches, fits them with a toy kernel smoother and
//! writes every kind of prediction plot to a local directory.
//!
//! Usage:
//! ```bash
//! RUST_LOG=np_plots=debug cargo run --bin dev -- --output-dir plots --dims 3
//! ```

use std::f64::consts::PI;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ndarray::{s, Array3, Axis};
use tracing::info;
use tracing_subscriber::EnvFilter;

use np_plots::figure::FigureSink;
use np_plots::{
    plot_functions, BatchData, Figure, FileSink, ModelInputs, OutputFormat, PlotConfig,
    PlotOptions, Prediction, PredictionPlotter,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Svg,
    Png,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Svg => OutputFormat::Svg,
            Format::Png => OutputFormat::Png,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "dev", about = "Render demo prediction plots from synthetic data")]
struct Args {
    /// Directory the figures are written to
    #[arg(long, default_value = "plots")]
    output_dir: PathBuf,

    /// JSON plot configuration; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of synthetic batches
    #[arg(long, default_value_t = 4)]
    batches: usize,

    /// Value dimensions for the N-D plots
    #[arg(long, default_value_t = 2)]
    dims: usize,

    /// Epoch label shown in figure titles
    #[arg(long, default_value = "0")]
    epoch: String,

    /// Query points per dimension (overrides the configuration)
    #[arg(long)]
    n_points: Option<usize>,

    /// Output image format (overrides the configuration)
    #[arg(long, value_enum)]
    format: Option<Format>,
}

const N_TARGET: usize = 40;
const CONTEXT_STRIDE: usize = 5;
const BANDWIDTH: f64 = 0.35;

/// Targets on [-2, 2], y = sin(freq * x + phase) with a per batch/dimension phase
fn synthesize(batches: usize, dims: usize) -> (Array3<f64>, Array3<f64>) {
    let target_x = Array3::from_shape_fn((batches, N_TARGET, dims), |(_, p, _)| {
        -2.0 + 4.0 * p as f64 / (N_TARGET - 1) as f64
    });
    let target_y = Array3::from_shape_fn((batches, N_TARGET, dims), |(b, p, d)| {
        let phase = PI * (b as f64 * 0.37 + d as f64 * 0.61);
        let freq = 1.0 + 0.5 * d as f64;
        0.8 * (freq * target_x[[b, p, d]] + phase).sin()
    });
    (target_x, target_y)
}

/// Every `CONTEXT_STRIDE`-th target point
fn context_of(values: &Array3<f64>) -> Array3<f64> {
    values.slice(s![.., ..;CONTEXT_STRIDE, ..]).to_owned()
}

/// Nadaraya-Watson smoother with a Gaussian kernel; std is the weighted residual spread
fn kernel_smoother(inputs: &ModelInputs<'_>) -> anyhow::Result<Prediction> {
    let shape = inputs.query_x.dim();
    let mut mean = Array3::zeros(shape);
    let mut std = Array3::zeros(shape);

    for (b, queries) in inputs.query_x.axis_iter(Axis(0)).enumerate() {
        for ((q, d), &x) in queries.indexed_iter() {
            let cx = inputs.context_x.slice(s![b, .., d]);
            let cy = inputs.context_y.slice(s![b, .., d]);

            let weights: Vec<f64> = cx
                .iter()
                .map(|&c| (-(x - c).powi(2) / (2.0 * BANDWIDTH * BANDWIDTH)).exp())
                .collect();
            let total: f64 = weights.iter().sum::<f64>().max(f64::MIN_POSITIVE);
            let mu = weights.iter().zip(cy.iter()).map(|(w, y)| w * y).sum::<f64>() / total;
            let var = weights
                .iter()
                .zip(cy.iter())
                .map(|(w, y)| w * (y - mu).powi(2))
                .sum::<f64>()
                / total;

            mean[[b, q, d]] = mu;
            std[[b, q, d]] = var.sqrt() + 0.05;
        }
    }

    Ok(Prediction { mean, std })
}

fn load_config(args: &Args) -> anyhow::Result<PlotConfig> {
    let mut config = match &args.config {
        Some(path) => PlotConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            info!("No configuration file given, using defaults");
            PlotConfig::default()
        }
    };
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if let Some(n_points) = args.n_points {
        config.n_points = n_points;
    }
    config.validate()?;
    Ok(config)
}

/// 2x2 grid of single-batch function plots, one panel per batch (first dimension only)
fn function_panels(
    target_x: &Array3<f64>,
    target_y: &Array3<f64>,
    context_x: &Array3<f64>,
    context_y: &Array3<f64>,
    prediction: &Prediction,
    config: &PlotConfig,
) -> Figure {
    let mut figure = Figure::grid("Function panels", 2, 2, config.size());
    let batches = target_x.len_of(Axis(0));

    for panel in 0..4.min(batches) {
        if let Some(axes) = figure.axes_mut(panel) {
            plot_functions(
                axes,
                target_x.slice(s![panel, .., 0..1]),
                target_y.slice(s![panel, .., 0..1]),
                context_x.slice(s![panel, .., 0..1]),
                context_y.slice(s![panel, .., 0..1]),
                prediction.mean.slice(s![panel, .., 0..1]),
                prediction.std.slice(s![panel, .., 0..1]),
            )
            .set_title(format!("Batch {}", panel));
        }
    }
    figure
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "np_plots=info,dev=info".into()),
        )
        .init();

    let start = Instant::now();
    let args = Args::parse();
    info!(?args, "Starting development run");

    let config = load_config(&args)?;
    let plotter = PredictionPlotter::new(config.clone())?;
    let mut sink = FileSink::new(&args.output_dir, config.output_format)?;

    // N-D plots
    let (target_x, target_y) = synthesize(args.batches, args.dims.max(1));
    let (context_x, context_y) = (context_of(&target_x), context_of(&target_y));
    let data = BatchData::new(
        context_x.view(),
        context_y.view(),
        target_x.view(),
        target_y.view(),
    );
    plotter.plot_predictions_nd(
        &kernel_smoother,
        &data,
        &PlotOptions::new(format!("{} (nd)", args.epoch)),
        &mut sink,
    )?;

    // 1-D plots
    let (target_x, target_y) = synthesize(args.batches, 1);
    let (context_x, context_y) = (context_of(&target_x), context_of(&target_y));
    let data = BatchData::new(
        context_x.view(),
        context_y.view(),
        target_x.view(),
        target_y.view(),
    );
    plotter.plot_predictions(
        &kernel_smoother,
        &data,
        &PlotOptions::new(format!("{} (1d)", args.epoch)),
        &mut sink,
    )?;

    // Single-batch panels, predicted at the target points themselves
    let prediction = kernel_smoother(&ModelInputs {
        context_x: context_x.view(),
        context_y: context_y.view(),
        query_x: target_x.view(),
    })?;
    let panels = function_panels(
        &target_x,
        &target_y,
        &context_x,
        &context_y,
        &prediction,
        &config,
    );
    sink.show(panels)?;

    info!(
        figures = sink.written().len(),
        output_dir = %sink.output_dir().display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Development run complete"
    );
    Ok(())
}
