//! Figure lifecycle
//!
//! Showing a figure moves it into a sink. The batch renderers build a fresh
//! figure per batch and show it immediately, so no figure outlives its batch.

use std::path::{Path, PathBuf};

use super::render::{render_to_file, OutputFormat};
use super::Figure;
use crate::error::Result;

/// Destination for finished figures
pub trait FigureSink {
    /// Display or persist `figure`; the sink owns it from here on
    fn show(&mut self, figure: Figure) -> Result<()>;
}

impl<S: FigureSink + ?Sized> FigureSink for &mut S {
    fn show(&mut self, figure: Figure) -> Result<()> {
        (**self).show(figure)
    }
}

/// Keeps every shown figure in memory, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    figures: Vec<Figure>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}

impl FigureSink for RecordingSink {
    fn show(&mut self, figure: Figure) -> Result<()> {
        self.figures.push(figure);
        Ok(())
    }
}

/// Renders each shown figure to its own file in `output_dir`, then drops it
#[derive(Debug)]
pub struct FileSink {
    output_dir: PathBuf,
    format: OutputFormat,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Create the sink, creating `output_dir` if needed
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            format,
            written: Vec::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Paths written so far, in show order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Unique path for a figure label: `Epoch 3, Batch 0` -> `epoch_3_batch_0.svg`
    fn path_for(&self, label: &str) -> PathBuf {
        let stem = file_stem(label);
        let ext = self.format.extension();
        let mut path = self.output_dir.join(format!("{}.{}", stem, ext));
        let mut n = 1;
        while self.written.contains(&path) {
            path = self.output_dir.join(format!("{}_{}.{}", stem, n, ext));
            n += 1;
        }
        path
    }
}

impl FigureSink for FileSink {
    fn show(&mut self, figure: Figure) -> Result<()> {
        let path = self.path_for(&figure.label);
        render_to_file(&figure, &path, self.format)?;
        tracing::info!(path = %path.display(), "Figure written");
        self.written.push(path);
        Ok(())
    }
}

/// Lowercase alphanumerics, everything else collapsed to single underscores
fn file_stem(label: &str) -> String {
    let mut stem = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_end_matches('_');
    if stem.is_empty() {
        "figure".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;
    use tempfile::TempDir;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Epoch 3, Batch 0"), "epoch_3_batch_0");
        assert_eq!(file_stem("  --Epoch 1.5--  "), "epoch_1_5");
        assert_eq!(file_stem("!!!"), "figure");
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        assert!(sink.is_empty());
        sink.show(Figure::new("first", (10, 10))).unwrap();
        sink.show(Figure::new("second", (10, 10))).unwrap();

        let labels: Vec<&str> = sink.figures().iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second"]);
    }

    #[test]
    fn test_mut_reference_is_a_sink() {
        fn show_twice<S: FigureSink>(mut sink: S) {
            sink.show(Figure::new("a", (10, 10))).unwrap();
            sink.show(Figure::new("b", (10, 10))).unwrap();
        }
        let mut sink = RecordingSink::new();
        show_twice(&mut sink);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_file_sink_creates_directory_and_dedupes_paths() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("plots");
        let mut sink = FileSink::new(&dir, OutputFormat::Png).unwrap();
        assert!(dir.is_dir());

        let first = sink.path_for("Epoch 1, Batch 0");
        assert_eq!(first, dir.join("epoch_1_batch_0.png"));
        sink.written.push(first);
        assert_eq!(
            sink.path_for("Epoch 1, Batch 0"),
            dir.join("epoch_1_batch_0_1.png")
        );
    }

    #[test]
    fn test_file_sink_writes_one_file_per_figure() {
        let temp = TempDir::new().unwrap();
        let mut sink = FileSink::new(temp.path(), OutputFormat::Svg).unwrap();
        for label in ["Epoch 1, Batch 0", "Epoch 1, Batch 0"] {
            let mut figure = Figure::new(label, (320, 240));
            figure.main_axes_mut().set_title(label);
            match sink.show(figure) {
                Err(PlotError::Render(message)) if message.to_lowercase().contains("font") => {
                    eprintln!("skipping rasterization: {}", message);
                    return;
                }
                other => other.unwrap(),
            }
        }

        assert_eq!(
            sink.written(),
            &[
                temp.path().join("epoch_1_batch_0.svg"),
                temp.path().join("epoch_1_batch_0_1.svg")
            ]
        );
        assert!(sink.written().iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_file_sink_reports_undrawable_figures() {
        let temp = TempDir::new().unwrap();
        let mut sink = FileSink::new(temp.path(), OutputFormat::Svg).unwrap();
        let mut figure = Figure::new("unbounded", (320, 240));
        figure.main_axes_mut().set_ylim(f64::NEG_INFINITY, 0.0);

        assert!(matches!(sink.show(figure), Err(PlotError::Render(_))));
        assert!(sink.written().is_empty());
    }
}
