//! Pipeline module.
//!
//! This module provides the analysis pipeline, its outlier stage and
//! progress reporting.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{AnalysisPipeline, AnalysisPipelineBuilder};
pub use outliers::OutlierDetector;
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
