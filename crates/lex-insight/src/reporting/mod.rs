//! PDF report generation.
//!
//! [`ReportGenerator`] lays the analysis artifacts out on US Letter pages;
//! [`pdf::PdfDocument`] holds the laid-out pages and serializes them with
//! `printpdf`.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_insight::reporting::{ReportGenerator, ReportParams};
//!
//! let pdf = ReportGenerator::new().generate(&ReportParams {
//!     statistics: &summary.statistics,
//!     missing: &summary.missing,
//!     outliers: &outliers,
//!     histogram: &histogram,
//!     correlation: &heatmap,
//! })?;
//! std::fs::write("report.pdf", pdf)?;
//! ```

mod generator;
pub mod pdf;

pub use generator::{PAGE_MARGIN, REPORT_TITLE, ReportGenerator, ReportParams, fit_text, footer_ops};
