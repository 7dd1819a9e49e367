use crate::error::AnalysisError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Fixed message attached to every successful result.
pub const SUCCESS_MESSAGE: &str = "Analysis and plots generated successfully";

/// Descriptive statistics for one numeric column.
///
/// Serialized with the conventional describe() keys
/// (`count, mean, std, min, 25%, 50%, 75%, max`). Absent values (e.g. the
/// standard deviation of a single value) serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// Number of non-missing values.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStatistics {
    /// Statistic name/value pairs in display order, formatted for reports.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("count", self.count.to_string()),
            ("mean", format_stat(self.mean)),
            ("std", format_stat(self.std)),
            ("min", format_stat(self.min)),
            ("25%", format_stat(self.p25)),
            ("50%", format_stat(self.p50)),
            ("75%", format_stat(self.p75)),
            ("max", format_stat(self.max)),
        ]
    }
}

/// Format an optional statistic for human-readable output.
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.4}", v),
        Some(v) => v.to_string(),
        None => "NaN".to_string(),
    }
}

/// Outlier count and IQR bounds for one numeric column.
///
/// Bounds are rounded to 2 decimal places; the count was computed against
/// the unrounded bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierStats {
    pub count: usize,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

/// Column name -> statistics, in dataset column order.
pub type SummaryStatistics = IndexMap<String, ColumnStatistics>;

/// Column name -> missing cell count, for every column.
pub type MissingSummary = IndexMap<String, usize>;

/// Numeric column name -> outlier stats, in dataset column order.
pub type OutlierSummary = IndexMap<String, OutlierStats>;

/// Successful outcome of one analysis run.
///
/// Binary artifacts are already base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub summary: SummaryStatistics,
    pub missing_summary: MissingSummary,
    pub outliers_summary: OutlierSummary,
    pub histogram_plot: String,
    pub correlation_plot: String,
    pub pdf_report: String,
    pub message: String,
}

/// Terminal output of the pipeline: exactly one of the two shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Success(AnalysisReport),
    Failure { error: String },
}

impl AnalysisResult {
    /// Build the failure shape from an error.
    pub fn failure(error: &AnalysisError) -> Self {
        Self::Failure {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The error message, if this is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            Self::Success(_) => None,
        }
    }
}

impl From<crate::error::Result<AnalysisReport>> for AnalysisResult {
    fn from(outcome: crate::error::Result<AnalysisReport>) -> Self {
        match outcome {
            Ok(report) => Self::Success(report),
            Err(e) => Self::failure(&e),
        }
    }
}
