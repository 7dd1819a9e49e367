//! Error types for the analysis pipeline.
//!
//! Every stage returns [`AnalysisError`]. Internally the variants are fine
//! grained (so logs and tests can tell a PDF failure from a PNG failure), but
//! each one maps onto exactly one [`ErrorKind`], which is the taxonomy callers
//! are expected to branch on. The user-visible shape of a failed run is only
//! the `Display` message (see [`crate::types::AnalysisResult`]).

use thiserror::Error;

/// Message reported when cleaning/filtering leaves no numeric columns.
pub const NO_NUMERIC_COLUMNS_MESSAGE: &str =
    "No numeric columns found in CSV after cleaning/filtering.";

/// Coarse error classification shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input file could not be read or parsed.
    LoadError,
    /// The input file extension is not recognised.
    UnsupportedFormat,
    /// No numeric column survived cleaning and filtering.
    NoNumericColumns,
    /// Anything else: rendering, layout, encoding.
    InternalError,
}

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// File could not be read or its content could not be parsed.
    #[error("Failed to load '{path}': {reason}")]
    Load { path: String, reason: String },

    /// File extension is not one the loader understands.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Cleaning/filtering left zero numeric columns.
    #[error("{}", NO_NUMERIC_COLUMNS_MESSAGE)]
    NoNumericColumns,

    /// Plot rendering failed.
    #[error("Failed to render plot: {0}")]
    Render(String),

    /// Report layout failed.
    #[error("Failed to build report: {0}")]
    Report(String),

    /// Internal error (e.g., a panic caught at the pipeline boundary).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// PNG encode/decode error wrapper.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// PDF serialization error wrapper.
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Build a [`AnalysisError::Load`] for the given path.
    pub fn load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Classify the error into the pipeline taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load { .. } | Self::Io(_) => ErrorKind::LoadError,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::NoNumericColumns => ErrorKind::NoNumericColumns,
            Self::Render(_)
            | Self::Report(_)
            | Self::Internal(_)
            | Self::Polars(_)
            | Self::Image(_)
            | Self::Pdf(_)
            | Self::Json(_) => ErrorKind::InternalError,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// Get a stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::LoadError => "LOAD_ERROR",
            ErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorKind::NoNumericColumns => "NO_NUMERIC_COLUMNS",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_message() {
        let error = AnalysisError::UnsupportedFormat(".xyz".to_string());
        assert_eq!(error.to_string(), "Unsupported file type: .xyz");
        assert_eq!(error.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_no_numeric_columns_message() {
        let error = AnalysisError::NoNumericColumns;
        assert_eq!(
            error.to_string(),
            "No numeric columns found in CSV after cleaning/filtering."
        );
        assert_eq!(error.error_code(), "NO_NUMERIC_COLUMNS");
    }

    #[test]
    fn test_io_errors_are_load_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = AnalysisError::from(io);
        assert_eq!(error.kind(), ErrorKind::LoadError);
        assert_eq!(error.error_code(), "LOAD_ERROR");
    }

    #[test]
    fn test_render_errors_are_internal() {
        assert_eq!(
            AnalysisError::Render("bad".to_string()).kind(),
            ErrorKind::InternalError
        );
        assert_eq!(
            AnalysisError::Report("bad".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_with_context() {
        let error = AnalysisError::NoNumericColumns.with_context("During summary");
        assert!(error.to_string().contains("During summary"));
        assert_eq!(error.kind(), ErrorKind::NoNumericColumns); // Preserves original kind
    }
}
