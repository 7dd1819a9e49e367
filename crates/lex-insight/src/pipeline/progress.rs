//! Progress reporting for the analysis pipeline.
//!
//! Runs are synchronous and cannot be cancelled; reporters only observe.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_insight::AnalysisPipeline;
//!
//! let result = AnalysisPipeline::builder()
//!     .on_progress(|update| {
//!         eprintln!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .analyze("data/sales.csv");
//! ```

use serde::{Deserialize, Serialize};

/// Stages of one analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Reading the input file
    Loading,
    Cleaning,
    Filtering,
    /// Descriptive statistics and missing counts
    Summarizing,
    OutlierDetection,
    /// Histogram and correlation heatmap
    Plotting,
    ReportGeneration,
    /// Base64 encoding of the binary artifacts
    Encoding,
    Complete,
    Failed,
}

impl AnalysisStage {
    /// Stages that do work, in order.
    pub const WORK_STAGES: [AnalysisStage; 8] = [
        Self::Loading,
        Self::Cleaning,
        Self::Filtering,
        Self::Summarizing,
        Self::OutlierDetection,
        Self::Plotting,
        Self::ReportGeneration,
        Self::Encoding,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Cleaning Data",
            Self::Filtering => "Filtering Rows",
            Self::Summarizing => "Computing Statistics",
            Self::OutlierDetection => "Detecting Outliers",
            Self::Plotting => "Rendering Plots",
            Self::ReportGeneration => "Generating Report",
            Self::Encoding => "Encoding Artifacts",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run spent in this stage. Work stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Cleaning => 0.10,
            Self::Filtering => 0.05,
            Self::Summarizing => 0.10,
            Self::OutlierDetection => 0.05,
            Self::Plotting => 0.25,
            Self::ReportGeneration => 0.25,
            Self::Encoding => 0.05,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            stage => Self::WORK_STAGES
                .iter()
                .take_while(|s| *s != stage)
                .map(|s| s.weight())
                .sum(),
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + stage.weight() * stage_progress;
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates during a run.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved to a
/// worker thread while its host keeps observing.
pub trait ProgressReporter: Send + Sync {
    /// Called at least once per stage. Keep it cheap.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
static_assertions::assert_impl_all!(AnalysisStage: Send, Sync, Copy);
