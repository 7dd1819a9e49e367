//! Data profiling module for dataset analysis.
//!
//! This module provides:
//! - Descriptive statistics for every numeric column
//! - Missing-value counts for every column
//! - The pairwise Pearson correlation matrix used by the heatmap

mod statistics;

pub(crate) use statistics::{percentile, sorted};

use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::{MissingSummary, SummaryStatistics};
use crate::utils::{is_numeric_dtype, numeric_column_names, numeric_values, present_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Statistics and missing counts for one dataset.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    /// Per numeric column, in dataset column order.
    pub statistics: SummaryStatistics,
    /// Per column (numeric or not), in dataset column order.
    pub missing: MissingSummary,
}

/// Pairwise Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Column names, in dataset column order.
    pub columns: Vec<String>,
    /// Row-major coefficients; `values[i][j]` pairs `columns[i]` with `columns[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

/// Data profiler for the summary stage.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarise a dataset.
    ///
    /// Fails with [`AnalysisError::NoNumericColumns`] when the dataset has no
    /// numeric column.
    pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
        let numeric = numeric_column_names(df);
        if numeric.is_empty() {
            return Err(AnalysisError::NoNumericColumns);
        }

        let missing = Self::missing_summary(df)?;

        let mut by_column = SummaryStatistics::new();
        for name in &numeric {
            let values = present_values(df.column(name)?.as_materialized_series())
                .context(format!("Failed to read '{}'", name))?;
            let stats = statistics::column_statistics(&values);
            debug!("Column '{}': {} values, mean {:?}", name, stats.count, stats.mean);
            by_column.insert(name.clone(), stats);
        }

        info!(
            "Summarised {} numeric of {} columns",
            by_column.len(),
            df.width()
        );

        Ok(DatasetSummary {
            statistics: by_column,
            missing,
        })
    }

    /// Count missing cells in every column. NaN counts as missing in float
    /// columns.
    pub fn missing_summary(df: &DataFrame) -> Result<MissingSummary> {
        let mut missing = MissingSummary::new();
        for col in df.get_columns() {
            let count = if is_numeric_dtype(col.dtype()) {
                numeric_values(col.as_materialized_series())?
                    .iter()
                    .filter(|v| v.is_none())
                    .count()
            } else {
                col.null_count()
            };
            missing.insert(col.name().to_string(), count);
        }
        Ok(missing)
    }

    /// Pearson correlation matrix over every numeric column.
    ///
    /// The diagonal is always 1.0. Off-diagonal cells without enough shared
    /// rows or with a constant side are NaN.
    pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
        let columns = numeric_column_names(df);
        let data: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|name| numeric_values(df.column(name)?.as_materialized_series()))
            .collect::<PolarsResult<_>>()?;

        let n = columns.len();
        let mut values = vec![vec![1.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let r = statistics::pearson(&data[i], &data[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix { columns, values })
    }
}

// =============================================================================
// Tests
// =============================================================================
