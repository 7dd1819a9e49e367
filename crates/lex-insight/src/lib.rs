//! CSV Analysis Pipeline Library
//!
//! Loads a tabular file, applies optional cleaning and row filters, and
//! produces descriptive statistics, IQR outlier bounds, two PNG plots and a
//! multi-page PDF report, all packaged into one JSON-serializable result.
//!
//! # Overview
//!
//! A run is strictly linear:
//!
//! 1. **Loading**: `.csv` with a header row, or headerless `.data`
//! 2. **Cleaning**: duplicate removal, forward fill, date/ZIP normalisation
//! 3. **Filtering**: exact `date` match and case-insensitive `location` match
//! 4. **Summary**: describe-style statistics and missing counts
//! 5. **Outliers**: IQR fences per numeric column
//! 6. **Plots**: histogram of the first numeric column and a correlation heatmap
//! 7. **Report**: US Letter PDF embedding everything above
//!
//! Binary artifacts are base64 encoded in the final [`AnalysisResult`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_insight::{AnalysisConfig, AnalysisPipeline, CleaningOptions, FilterOptions};
//!
//! let config = AnalysisConfig::builder()
//!     .cleaning(CleaningOptions { standardize_formats: true, ..Default::default() })
//!     .filters(FilterOptions { location: Some("york".into()), ..Default::default() })
//!     .build()?;
//!
//! let result = AnalysisPipeline::builder()
//!     .config(config)
//!     .build()?
//!     .analyze("data/sales.csv");
//!
//! match result.error() {
//!     None => println!("{}", serde_json::to_string_pretty(&result)?),
//!     Some(message) => eprintln!("analysis failed: {message}"),
//! }
//! ```
//!
//! # Errors
//!
//! Every stage returns [`AnalysisError`]; [`AnalysisError::kind`] classifies
//! it as a load error, an unsupported format, a dataset without numeric
//! columns, or an internal error. [`AnalysisPipeline::analyze`] turns any of
//! them into the `{"error": ...}` result shape.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod plots;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, CleaningOptions, ConfigValidationError, FilterOptions,
};
pub use error::{AnalysisError, ErrorKind, Result as AnalysisOutcome, ResultExt};
pub use filter::DataFilter;
pub use loader::{DataLoader, SourceFormat};
pub use pipeline::{
    AnalysisPipeline, AnalysisPipelineBuilder, AnalysisStage, ClosureProgressReporter,
    OutlierDetector, ProgressReporter, ProgressUpdate,
};
pub use plots::{PlotArtifact, PlotKind, PlotRenderer};
pub use profiler::{CorrelationMatrix, DataProfiler, DatasetSummary};
pub use reporting::{ReportGenerator, ReportParams};
pub use types::{
    AnalysisReport, AnalysisResult, ColumnStatistics, MissingSummary, OutlierStats,
    OutlierSummary, SUCCESS_MESSAGE, SummaryStatistics,
};
