//! Parsing for headerless delimited files.
//!
//! Whitespace-delimited parsing is attempted first, then comma-delimited.
//! Columns get positional names (`col_0`, `col_1`, ...) and a dtype inferred
//! from their cells: Int64 when every present cell is an integer, Float64
//! when every present cell is a number, String otherwise.

use crate::utils::is_missing_marker;
use polars::prelude::*;
use tracing::debug;

/// Tokenized rows of a headerless file.
type Rows<'a> = Vec<Vec<&'a str>>;

/// Parse headerless content into a DataFrame.
///
/// Returns a human-readable reason on failure.
pub(crate) fn parse_headerless(content: &str) -> Result<DataFrame, String> {
    let rows = match split_whitespace_rows(content) {
        Some(rows) => rows,
        None => {
            debug!("Whitespace-delimited parsing failed, falling back to commas");
            split_comma_rows(content)
                .ok_or_else(|| "rows have inconsistent field counts".to_string())?
        }
    };

    if rows.is_empty() {
        return Err("file contains no data rows".to_string());
    }

    build_frame(&rows).map_err(|e| e.to_string())
}

fn data_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|line| !line.trim().is_empty())
}

/// Split on runs of whitespace. Fails on ragged rows, or when any token
/// still contains a comma (the file is comma data, maybe with padding).
fn split_whitespace_rows(content: &str) -> Option<Rows<'_>> {
    let rows: Rows<'_> = data_lines(content)
        .map(|line| line.split_whitespace().collect())
        .collect();

    if !is_rectangular(&rows) || rows.iter().flatten().any(|cell| cell.contains(',')) {
        return None;
    }

    Some(rows)
}

/// Split on commas, trimming each field. Fails on ragged rows.
fn split_comma_rows(content: &str) -> Option<Rows<'_>> {
    let rows: Rows<'_> = data_lines(content)
        .map(|line| line.split(',').map(str::trim).collect())
        .collect();

    is_rectangular(&rows).then_some(rows)
}

fn is_rectangular(rows: &Rows<'_>) -> bool {
    match rows.first() {
        Some(first) => rows.iter().all(|row| row.len() == first.len()),
        None => true,
    }
}

fn build_frame(rows: &Rows<'_>) -> PolarsResult<DataFrame> {
    let width = rows.first().map_or(0, Vec::len);
    let columns: Vec<Column> = (0..width)
        .map(|index| {
            let cells: Vec<&str> = rows.iter().map(|row| row[index]).collect();
            infer_column(&format!("col_{index}"), &cells)
        })
        .collect();

    DataFrame::new(columns)
}

/// Build a typed column from raw cells.
pub(crate) fn infer_column(name: &str, cells: &[&str]) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .copied()
        .filter(|cell| !is_missing_marker(cell))
        .collect();

    let series = if present.iter().all(|cell| cell.parse::<i64>().is_ok())
        && !present.is_empty()
    {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|cell| cell.parse::<i64>().ok())
            .collect();
        Series::new(name.into(), values)
    } else if present.iter().all(|cell| cell.parse::<f64>().is_ok()) {
        // Also reached by columns with no present cells at all.
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| {
                if is_missing_marker(cell) {
                    None
                } else {
                    cell.parse::<f64>().ok()
                }
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<Option<&str>> = cells
            .iter()
            .map(|cell| (!is_missing_marker(cell)).then_some(*cell))
            .collect();
        Series::new(name.into(), values)
    };

    Column::from(series)
}
