//! Outlier detection module.
//!
//! Counts values outside the IQR fences of every numeric column.

use crate::error::{Result, ResultExt};
use crate::profiler::{percentile, sorted};
use crate::types::{OutlierStats, OutlierSummary};
use crate::utils::{numeric_column_names, present_values, round_to};
use polars::prelude::*;
use tracing::debug;

/// Decimal places kept on reported bounds.
const BOUND_DECIMALS: i32 = 2;

/// Unrounded `(lower, upper)` IQR fences, or `None` when there are no values.
pub(crate) fn iqr_fences(values: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    let sorted = sorted(values);
    let q1 = percentile(&sorted, 0.25)?;
    let q3 = percentile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Detects outliers with the interquartile-range rule.
pub struct OutlierDetector;

impl OutlierDetector {
    /// Outlier stats for every numeric column, in dataset column order.
    pub fn detect(df: &DataFrame, multiplier: f64) -> Result<OutlierSummary> {
        let mut summary = OutlierSummary::new();

        for name in numeric_column_names(df) {
            let values = present_values(df.column(&name)?.as_materialized_series())
                .context(format!("Failed to read '{}'", name))?;
            let stats = Self::column_outliers(&values, multiplier);
            if stats.count > 0 {
                debug!(
                    "Column '{}': {} outliers outside [{:?}, {:?}]",
                    name, stats.count, stats.lower_bound, stats.upper_bound
                );
            }
            summary.insert(name, stats);
        }

        Ok(summary)
    }

    /// Count values strictly outside the fences.
    ///
    /// The comparison uses unrounded fences; only the reported bounds are
    /// rounded.
    pub fn column_outliers(values: &[f64], multiplier: f64) -> OutlierStats {
        let Some((lower, upper)) = iqr_fences(values, multiplier) else {
            return OutlierStats {
                count: 0,
                lower_bound: None,
                upper_bound: None,
            };
        };

        let count = values.iter().filter(|&&v| v < lower || v > upper).count();

        OutlierStats {
            count,
            lower_bound: Some(round_to(lower, BOUND_DECIMALS)),
            upper_bound: Some(round_to(upper, BOUND_DECIMALS)),
        }
    }
}
