//! Plot rendering.
//!
//! Produces the two PNG artifacts of a run:
//! - A histogram of the first numeric column
//! - An annotated heatmap of the Pearson correlation matrix
//!
//! Every render draws into its own plotters bitmap (see [`canvas::render_png`]);
//! nothing is shared between calls.

pub mod canvas;
mod heatmap;
mod histogram;

pub use heatmap::{HEATMAP_TITLE, render_heatmap};
pub use histogram::{Bins, HISTOGRAM_HEIGHT, HISTOGRAM_WIDTH, render_histogram};

use crate::config::DEFAULT_HISTOGRAM_BINS;
use crate::error::{AnalysisError, Result};
use crate::profiler::DataProfiler;
use crate::utils::{numeric_column_names, present_values};
use polars::prelude::*;
use std::fmt;
use tracing::debug;

/// What a plot shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotKind {
    Histogram { column: String },
    Correlation,
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Histogram { column } => write!(f, "histogram of {}", column),
            Self::Correlation => write!(f, "correlation matrix"),
        }
    }
}

/// An encoded PNG plus its label.
#[derive(Debug, Clone)]
pub struct PlotArtifact {
    pub kind: PlotKind,
    /// Plot title, also used as the report heading.
    pub label: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Renders the plots of one dataset.
#[derive(Debug, Clone, Copy)]
pub struct PlotRenderer {
    bins: usize,
}

impl Default for PlotRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTOGRAM_BINS)
    }
}

impl PlotRenderer {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }

    /// Histogram of the first numeric column, by dataset column order.
    pub fn histogram(&self, df: &DataFrame) -> Result<PlotArtifact> {
        let column = numeric_column_names(df)
            .into_iter()
            .next()
            .ok_or(AnalysisError::NoNumericColumns)?;
        let values = present_values(df.column(&column)?.as_materialized_series())?;
        debug!("Rendering histogram of '{}' ({} values)", column, values.len());
        render_histogram(&column, &values, self.bins)
    }

    /// Heatmap of the correlation matrix over every numeric column.
    pub fn correlation_heatmap(&self, df: &DataFrame) -> Result<PlotArtifact> {
        let matrix = DataProfiler::correlation_matrix(df)?;
        if matrix.is_empty() {
            return Err(AnalysisError::NoNumericColumns);
        }
        debug!("Rendering {}x{} correlation heatmap", matrix.len(), matrix.len());
        render_heatmap(&matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_uses_first_numeric_column() {
        let df = df!(
            "name" => ["a", "b", "c"],
            "second" => [1.0, 2.0, 3.0],
            "third" => [4.0, 5.0, 6.0],
        )
        .unwrap();

        let artifact = PlotRenderer::default().histogram(&df).unwrap();
        assert_eq!(
            artifact.kind,
            PlotKind::Histogram {
                column: "second".to_string()
            }
        );
        assert_eq!(artifact.label, "Histogram of second");
    }

    #[test]
    fn test_heatmap_for_single_numeric_column() {
        let df = df!("only" => [1.0, 2.0, 3.0]).unwrap();
        let artifact = PlotRenderer::default().correlation_heatmap(&df).unwrap();
        assert_eq!(artifact.kind, PlotKind::Correlation);
        assert!(!artifact.png.is_empty());
    }

    #[test]
    fn test_no_numeric_columns() {
        let df = df!("name" => ["a", "b"]).unwrap();
        let renderer = PlotRenderer::default();
        assert!(matches!(
            renderer.histogram(&df),
            Err(AnalysisError::NoNumericColumns)
        ));
        assert!(matches!(
            renderer.correlation_heatmap(&df),
            Err(AnalysisError::NoNumericColumns)
        ));
    }

    #[test]
    fn test_plot_kind_display() {
        let kind = PlotKind::Histogram {
            column: "x".to_string(),
        };
        assert_eq!(kind.to_string(), "histogram of x");
        assert_eq!(PlotKind::Correlation.to_string(), "correlation matrix");
    }
}
