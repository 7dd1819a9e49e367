//! Data cleaning module.
//!
//! This module provides the fixed set of cleaning operations:
//! - Removing duplicate rows (first occurrence wins, order preserved)
//! - Forward-filling missing cells
//! - Standardising the `date` and `zip` columns
//!
//! Operations run in that order, so standardisation always sees deduplicated,
//! filled data. Cleaning never fails on bad cell values; they degrade to
//! missing instead.

mod formats;

pub use formats::{pad_zip, parse_calendar_date};

use crate::config::CleaningOptions;
use crate::error::{Result, ResultExt};
use crate::utils::{owned_series, text_values};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Column rewritten as an ISO 8601 date by format standardisation.
pub const DATE_COLUMN: &str = "date";

/// Column rewritten as a 5-character ZIP code by format standardisation.
pub const ZIP_COLUMN: &str = "zip";

/// Data cleaner for the configured cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Apply every enabled operation and return the cleaned dataset.
    ///
    /// The caller's DataFrame is never modified.
    pub fn clean(df: &DataFrame, options: &CleaningOptions) -> Result<DataFrame> {
        let mut df = df.clone();

        if options.is_noop() {
            debug!("No cleaning operations enabled");
            return Ok(df);
        }

        info!("Cleaning dataset ({} rows)", df.height());

        if options.remove_duplicates {
            df = Self::remove_duplicates(&df)?;
        }

        if options.handle_missing {
            df = Self::forward_fill(&df)?;
        }

        if options.standardize_formats {
            df = Self::standardize_formats(&df)?;
        }

        Ok(df)
    }

    /// Drop rows that repeat an earlier row exactly.
    ///
    /// Rows compare by the text rendering of each cell; two missing cells are
    /// equal.
    pub fn remove_duplicates(df: &DataFrame) -> Result<DataFrame> {
        if df.height() == 0 || df.width() == 0 {
            return Ok(df.clone());
        }

        let columns: Vec<Vec<Option<String>>> = df
            .get_columns()
            .iter()
            .map(|col| text_values(col.as_materialized_series()))
            .collect::<PolarsResult<_>>()
            .context("Failed to render rows for duplicate detection")?;

        let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(df.height());
        let keep: Vec<bool> = (0..df.height())
            .map(|row| {
                let key: Vec<Option<&str>> =
                    columns.iter().map(|col| col[row].as_deref()).collect();
                seen.insert(key)
            })
            .collect();

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let deduped = df.filter(&mask)?;

        let removed = df.height() - deduped.height();
        if removed > 0 {
            debug!("Removed {} duplicate rows", removed);
        } else {
            debug!("No duplicate rows found");
        }

        Ok(deduped)
    }

    /// Fill each missing cell with the nearest preceding value in its column.
    ///
    /// Leading missing cells stay missing. Column dtypes are preserved.
    pub fn forward_fill(df: &DataFrame) -> Result<DataFrame> {
        let mut df = df.clone();
        let names: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| col.name().to_string())
            .collect();

        for name in names {
            let series = df.column(&name)?.as_materialized_series().clone();
            let before = series.null_count();
            let filled = series.fill_null(FillNullStrategy::Forward(None))?;
            debug!(
                "Forward-filled '{}': {} -> {} missing",
                name,
                before,
                filled.null_count()
            );
            df.replace(&name, filled)?;
        }

        Ok(df)
    }

    /// Rewrite the `date` column as ISO dates and the `zip` column as
    /// zero-padded text, when those columns exist.
    pub fn standardize_formats(df: &DataFrame) -> Result<DataFrame> {
        let mut df = df.clone();

        if let Some(series) = owned_series(&df, DATE_COLUMN) {
            let (dates, failures) = formats::standardize_date_column(&series)
                .context("Failed to standardize dates")?;
            if failures > 0 {
                warn!("{} date value(s) could not be parsed and are now missing", failures);
            }
            df.replace(DATE_COLUMN, dates)?;
        }

        if let Some(series) = owned_series(&df, ZIP_COLUMN) {
            let zips = formats::standardize_zip_column(&series)
                .context("Failed to standardize zip codes")?;
            df.replace(ZIP_COLUMN, zips)?;
        }

        Ok(df)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::numeric_values;

    fn texts(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        text_values(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn all_options() -> CleaningOptions {
        CleaningOptions {
            remove_duplicates: true,
            handle_missing: true,
            standardize_formats: true,
        }
    }

    // =========================================================================
    // Duplicate removal
    // =========================================================================

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let df = df!(
            "a" => [3, 1, 3, 2, 1],
            "b" => ["x", "y", "x", "z", "y"],
        )
        .unwrap();

        let out = DataCleaner::remove_duplicates(&df).unwrap();
        assert_eq!(out.height(), 3);

        assert_eq!(texts(&out, "a"), owned(&[Some("3"), Some("1"), Some("2")]));
    }

    #[test]
    fn test_remove_duplicates_treats_missing_as_equal() {
        let df = df!(
            "a" => [Some(1.0), None, None],
            "b" => [Some("x"), None, None],
        )
        .unwrap();

        let out = DataCleaner::remove_duplicates(&df).unwrap();
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let df = df!("a" => [1, 1, 2, 2, 3]).unwrap();
        let once = DataCleaner::remove_duplicates(&df).unwrap();
        let twice = DataCleaner::remove_duplicates(&once).unwrap();
        assert_eq!(once.height(), twice.height());
        assert!(once.equals(&twice));
    }

    // =========================================================================
    // Forward fill
    // =========================================================================

    #[test]
    fn test_forward_fill() {
        let df = df!(
            "a" => [None, Some(1.0), None, Some(3.0), None],
            "s" => [Some("x"), None, None, Some("y"), None],
        )
        .unwrap();

        let out = DataCleaner::forward_fill(&df).unwrap();

        let a = numeric_values(out.column("a").unwrap().as_materialized_series()).unwrap();
        assert_eq!(a, vec![None, Some(1.0), Some(1.0), Some(3.0), Some(3.0)]);

        assert_eq!(
            texts(&out, "s"),
            owned(&[Some("x"), Some("x"), Some("x"), Some("y"), Some("y")])
        );
    }

    #[test]
    fn test_forward_fill_keeps_dtype() {
        let df = df!("n" => [Some(1i64), None, Some(3)]).unwrap();
        let out = DataCleaner::forward_fill(&df).unwrap();
        assert_eq!(out.column("n").unwrap().dtype(), &DataType::Int64);
        assert_eq!(out.column("n").unwrap().null_count(), 0);
    }

    // =========================================================================
    // Format standardisation
    // =========================================================================

    #[test]
    fn test_standardize_zip() {
        let df = df!(
            "zip" => [123i64, 4567, 12345],
            "v" => [1.0, 2.0, 3.0],
        )
        .unwrap();

        let out = DataCleaner::standardize_formats(&df).unwrap();
        assert_eq!(out.column("zip").unwrap().dtype(), &DataType::String);
        assert_eq!(
            texts(&out, "zip"),
            owned(&[Some("00123"), Some("04567"), Some("12345")])
        );
    }

    #[test]
    fn test_standardize_dates() {
        let df = df!("date" => ["03/15/2024", "not a date", "2024-03-16"]).unwrap();
        let out = DataCleaner::standardize_formats(&df).unwrap();
        assert_eq!(
            texts(&out, "date"),
            owned(&[Some("2024-03-15"), None, Some("2024-03-16")])
        );
    }

    #[test]
    fn test_standardize_without_target_columns_is_noop() {
        let df = df!("a" => [1, 2]).unwrap();
        let out = DataCleaner::standardize_formats(&df).unwrap();
        assert!(out.equals(&df));
    }

    // =========================================================================
    // Full cleaning
    // =========================================================================

    #[test]
    fn test_clean_noop_returns_equal_frame() {
        let df = df!("a" => [1, 1, 2]).unwrap();
        let out = DataCleaner::clean(&df, &CleaningOptions::default()).unwrap();
        assert!(out.equals(&df));
    }

    #[test]
    fn test_clean_applies_in_order() {
        // Duplicate rows are removed before filling; filled dates are then
        // standardised.
        let df = df!(
            "date" => [Some("01/02/2024"), Some("01/02/2024"), None],
            "v" => [Some(1.0), Some(1.0), Some(2.0)],
        )
        .unwrap();

        let out = DataCleaner::clean(&df, &all_options()).unwrap();
        assert_eq!(out.height(), 2);
        assert_eq!(
            texts(&out, "date"),
            owned(&[Some("2024-01-02"), Some("2024-01-02")])
        );
    }

    #[test]
    fn test_clean_does_not_touch_input() {
        let df = df!("a" => [1, 1]).unwrap();
        let _ = DataCleaner::clean(&df, &all_options()).unwrap();
        assert_eq!(df.height(), 2);
    }
}
