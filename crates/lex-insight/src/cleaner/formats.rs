//! Date and ZIP code normalisation.

use crate::utils::text_values;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Date-only layouts tried in order.
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
];

/// Date-time layouts tried in order; only the date part is kept.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Width ZIP codes are padded to.
const ZIP_WIDTH: usize = 5;

/// Parse a calendar date from any supported layout.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

/// Rewrite every cell as `YYYY-MM-DD`. Unparseable cells become null.
///
/// Returns the new text column and the number of cells that failed to parse.
pub(crate) fn standardize_date_column(series: &Series) -> PolarsResult<(Series, usize)> {
    let mut failures = 0;
    let values: Vec<Option<String>> = text_values(series)?
        .into_iter()
        .map(|cell| {
            let cell = cell?;
            let parsed = parse_calendar_date(&cell);
            if parsed.is_none() {
                failures += 1;
            }
            parsed.map(|date| date.format("%Y-%m-%d").to_string())
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), failures))
}

/// Left-pad a ZIP code with zeros to five characters.
///
/// Integral numbers lose any trailing `.0` first, so a zip read as a float
/// still pads correctly. Longer values are returned unchanged.
pub fn pad_zip(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits = match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && trimmed.contains('.') => {
            format!("{}", v as i64)
        }
        _ => trimmed.to_string(),
    };

    if digits.len() >= ZIP_WIDTH {
        digits
    } else {
        format!("{:0>width$}", digits, width = ZIP_WIDTH)
    }
}

/// Rewrite every cell through [`pad_zip`]. Missing cells stay missing.
pub(crate) fn standardize_zip_column(series: &Series) -> PolarsResult<Series> {
    let values: Vec<Option<String>> = text_values(series)?
        .into_iter()
        .map(|cell| cell.map(|s| pad_zip(&s)))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}
