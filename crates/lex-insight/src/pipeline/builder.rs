//! Analysis pipeline orchestration.
//!
//! This module provides the [`AnalysisPipeline`] struct and its builder,
//! which drive every stage of a run in order and package the result.

use crate::cleaner::DataCleaner;
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::filter::DataFilter;
use crate::loader::DataLoader;
use crate::pipeline::OutlierDetector;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::plots::PlotRenderer;
use crate::profiler::DataProfiler;
use crate::reporting::{ReportGenerator, ReportParams};
use crate::types::{AnalysisReport, AnalysisResult, SUCCESS_MESSAGE};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use polars::prelude::*;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The analysis pipeline.
///
/// Use [`AnalysisPipeline::builder()`] to create one with a custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_insight::{AnalysisPipeline, AnalysisConfig, CleaningOptions};
///
/// let config = AnalysisConfig::builder()
///     .cleaning(CleaningOptions { remove_duplicates: true, ..Default::default() })
///     .build()?;
///
/// let result = AnalysisPipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         eprintln!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .analyze("data/sales.csv");
///
/// println!("{}", serde_json::to_string(&result)?);
/// ```
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    renderer: PlotRenderer,
    reporter: ReportGenerator,
}

// A pipeline can be handed to a worker thread.
static_assertions::assert_impl_all!(AnalysisPipeline: Send);

impl AnalysisPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every stage and return the result shape for the host.
    ///
    /// This is the single failure boundary: errors and panics from any
    /// stage become [`AnalysisResult::Failure`], and no partial artifacts are
    /// ever returned.
    pub fn analyze(&self, path: impl AsRef<Path>) -> AnalysisResult {
        let path = path.as_ref();
        let outcome = match catch_unwind(AssertUnwindSafe(|| self.run(path))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(AnalysisError::Internal(panic_message(payload.as_ref()))),
        };

        if let Err(e) = &outcome {
            error!("Analysis of {} failed ({}): {}", path.display(), e.error_code(), e);
            self.report_progress(ProgressUpdate::failed(e.to_string()));
        }

        AnalysisResult::from(outcome)
    }

    /// Run every stage, returning typed errors.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<AnalysisReport> {
        let path = path.as_ref();
        let start_time = Instant::now();
        info!("Starting analysis of {}", path.display());

        let df = self.prepare(path)?;

        // Step 4: Summary statistics and missing counts
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Summarizing,
            0.0,
            "Computing summary statistics...",
        ));
        let summary = DataProfiler::summarize(&df)?;

        // Step 5: Outliers
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::OutlierDetection,
            0.0,
            "Detecting outliers...",
        ));
        let outliers = OutlierDetector::detect(&df, self.config.iqr_multiplier)?;
        let flagged: usize = outliers.values().map(|o| o.count).sum();
        info!("Step 5: {} outliers across {} columns", flagged, outliers.len());

        // Step 6: Plots
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Plotting,
            0.0,
            "Rendering histogram...",
        ));
        let histogram = self
            .renderer
            .histogram(&df)
            .context("Histogram rendering failed")?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Plotting,
            0.5,
            "Rendering correlation heatmap...",
        ));
        let correlation = self
            .renderer
            .correlation_heatmap(&df)
            .context("Heatmap rendering failed")?;
        info!("Step 6: Rendered {} and {}", histogram.kind, correlation.kind);

        // Step 7: Report
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::ReportGeneration,
            0.0,
            "Generating PDF report...",
        ));
        let pdf = self
            .reporter
            .generate(&ReportParams {
                statistics: &summary.statistics,
                missing: &summary.missing,
                outliers: &outliers,
                histogram: &histogram,
                correlation: &correlation,
            })
            .context("Report generation failed")?;
        info!("Step 7: Report is {} bytes", pdf.len());

        // Step 8: Transport encoding
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Encoding,
            0.0,
            "Encoding artifacts...",
        ));
        let report = AnalysisReport {
            summary: summary.statistics,
            missing_summary: summary.missing,
            outliers_summary: outliers,
            histogram_plot: STANDARD.encode(&histogram.png),
            correlation_plot: STANDARD.encode(&correlation.png),
            pdf_report: STANDARD.encode(&pdf),
            message: SUCCESS_MESSAGE.to_string(),
        };

        info!("Analysis completed in {:.2?}", start_time.elapsed());
        self.report_progress(ProgressUpdate::complete(SUCCESS_MESSAGE));
        Ok(report)
    }

    /// Load, clean and filter the dataset at `path`.
    pub fn prepare(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();

        // Step 1: Load
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            0.0,
            format!("Loading {}...", path.display()),
        ));
        let df = DataLoader::load(path)?;
        info!("Step 1: Loaded {} rows x {} columns", df.height(), df.width());

        // Step 2: Clean
        let df = if self.config.cleaning.is_noop() {
            debug!("Step 2: Skipping cleaning (no options enabled)");
            df
        } else {
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Cleaning,
                0.0,
                "Cleaning dataset...",
            ));
            let cleaned = DataCleaner::clean(&df, &self.config.cleaning)?;
            info!("Step 2: Cleaned dataset has {} rows", cleaned.height());
            cleaned
        };

        // Step 3: Filter
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Filtering,
            0.0,
            "Filtering rows...",
        ));
        let df = DataFilter::apply(&df, &self.config.filters)?;
        info!("Step 3: {} rows after filtering", df.height());

        Ok(df)
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic during analysis".to_string()
    }
}

/// Builder for creating an [`AnalysisPipeline`].
///
/// Use [`AnalysisPipeline::builder()`] to get started.
#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(AnalysisPipelineBuilder: Send);

impl AnalysisPipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience over [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<AnalysisPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(AnalysisPipeline {
            renderer: PlotRenderer::new(config.histogram_bins),
            reporter: ReportGenerator::new(),
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = AnalysisPipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().histogram_bins, 30);
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = AnalysisConfig {
            histogram_bins: 0,
            ..Default::default()
        };
        assert!(AnalysisPipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_pipeline_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = AnalysisPipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(AnalysisStage::Loading, 0.5, "Test"));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_reports_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();
        let pipeline = AnalysisPipeline::builder()
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();

        let file = csv_file("a,b\n1,2\n3,4\n5,6\n");
        pipeline.run(file.path()).unwrap();

        let seen = stages.lock().unwrap().clone();
        assert_eq!(seen.first(), Some(&AnalysisStage::Loading));
        assert_eq!(seen.last(), Some(&AnalysisStage::Complete));
        let report_at = seen.iter().position(|s| *s == AnalysisStage::ReportGeneration);
        let plot_at = seen.iter().position(|s| *s == AnalysisStage::Plotting);
        assert!(plot_at < report_at);
        // Cleaning is skipped when no option is enabled.
        assert!(!seen.contains(&AnalysisStage::Cleaning));
    }

    #[test]
    fn test_run_encodes_artifacts() {
        let pipeline = AnalysisPipeline::builder().build().unwrap();
        let file = csv_file("a,b\n1,2\n3,4\n5,6\n");
        let report = pipeline.run(file.path()).unwrap();

        let png = STANDARD.decode(&report.histogram_plot).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
        let pdf = STANDARD.decode(&report.pdf_report).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(report.message, SUCCESS_MESSAGE);
    }

    #[test]
    fn test_analyze_reports_failure_once() {
        let failures = Arc::new(AtomicUsize::new(0));
        let failures_clone = failures.clone();
        let pipeline = AnalysisPipeline::builder()
            .on_progress(move |update| {
                if update.stage == AnalysisStage::Failed {
                    failures_clone.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let result = pipeline.analyze("data/input.xyz");
        assert_eq!(result.error(), Some("Unsupported file type: .xyz"));
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_keeps_error_kind() {
        let pipeline = AnalysisPipeline::builder().build().unwrap();
        let file = csv_file("name\nalice\nbob\n");
        let err = pipeline.run(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoNumericColumns);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unexpected panic during analysis");
    }
}
