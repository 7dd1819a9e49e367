//! Shared utilities for the analysis pipeline.
//!
//! Helpers for classifying polars dtypes and for pulling plain Rust values
//! out of a `Series`, so that the statistics code never has to deal with
//! polars chunked arrays directly.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of the numeric columns, in dataset column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Owned copy of a column as a Series, if the column exists.
pub fn owned_series(df: &DataFrame, name: &str) -> Option<Series> {
    df.column(name)
        .ok()
        .map(|col| col.as_materialized_series().clone())
}

// =============================================================================
// Value Extraction Utilities
// =============================================================================

/// Markers treated as missing cells in addition to empty text.
pub const MISSING_MARKERS: [&str; 4] = ["na", "n/a", "nan", "null"];

/// Check if a raw text cell represents a missing value.
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Render every cell of a Series as text; missing cells stay `None`.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let as_text = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };

    Ok(as_text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read a numeric Series as `f64`, row aligned. Nulls and NaN become `None`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Only the present numeric values of a Series, in row order.
pub fn present_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Tests
// =============================================================================
