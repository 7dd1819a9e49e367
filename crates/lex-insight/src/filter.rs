//! Row filtering by the `date` and `location` columns.

use crate::config::FilterOptions;
use crate::error::{Result, ResultExt};
use crate::utils::{owned_series, text_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Column matched exactly by the date filter.
pub const DATE_COLUMN: &str = "date";

/// Column matched by case-insensitive substring in the location filter.
pub const LOCATION_COLUMN: &str = "location";

/// Applies the configured row filters.
pub struct DataFilter;

impl DataFilter {
    /// Keep only rows matching every applicable predicate.
    ///
    /// A predicate whose column is absent is skipped. Missing cells never
    /// match a predicate.
    pub fn apply(df: &DataFrame, filters: &FilterOptions) -> Result<DataFrame> {
        let mut keep = vec![true; df.height()];
        let mut applied = false;

        if let Some(date) = filters.date_predicate() {
            applied |= Self::restrict(df, DATE_COLUMN, &mut keep, |cell| cell == date)?;
        }

        if let Some(location) = filters.location_predicate() {
            let needle = location.to_lowercase();
            applied |= Self::restrict(df, LOCATION_COLUMN, &mut keep, |cell| {
                cell.to_lowercase().contains(&needle)
            })?;
        }

        if !applied {
            return Ok(df.clone());
        }

        let mask = BooleanChunked::from_slice("filter".into(), &keep);
        let filtered = df.filter(&mask)?;
        info!("Filtered {} -> {} rows", df.height(), filtered.height());
        Ok(filtered)
    }

    /// AND the predicate into `keep`. Returns false when the column is absent.
    fn restrict(
        df: &DataFrame,
        column: &str,
        keep: &mut [bool],
        predicate: impl Fn(&str) -> bool,
    ) -> Result<bool> {
        let Some(series) = owned_series(df, column) else {
            debug!("Filter column '{}' not present, skipping", column);
            return Ok(false);
        };

        let cells = text_values(&series).context(format!("Failed to read '{}'", column))?;
        for (flag, cell) in keep.iter_mut().zip(cells) {
            *flag = *flag && cell.as_deref().is_some_and(&predicate);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "date" => [Some("2024-01-01"), Some("2024-01-02"), Some("2024-01-01"), None],
            "location" => [Some("New York"), Some("Boston"), Some("york"), Some("York")],
            "value" => [1.0, 2.0, 3.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn test_no_filters_is_noop() {
        let df = sample();
        let out = DataFilter::apply(&df, &FilterOptions::default()).unwrap();
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn test_date_filter_exact_match() {
        let filters = FilterOptions {
            date: Some("2024-01-01".to_string()),
            location: None,
        };
        let out = DataFilter::apply(&sample(), &filters).unwrap();
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn test_location_filter_case_insensitive_substring() {
        let filters = FilterOptions {
            date: None,
            location: Some("YORK".to_string()),
        };
        let out = DataFilter::apply(&sample(), &filters).unwrap();
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let filters = FilterOptions {
            date: Some("2024-01-01".to_string()),
            location: Some("york".to_string()),
        };
        let out = DataFilter::apply(&sample(), &filters).unwrap();
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn test_missing_cells_never_match() {
        let filters = FilterOptions {
            date: Some("2024-01-02".to_string()),
            location: None,
        };
        let out = DataFilter::apply(&sample(), &filters).unwrap();
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn test_absent_column_is_noop() {
        let df = df!("value" => [1.0, 2.0, 3.0]).unwrap();
        let filters = FilterOptions {
            date: Some("2024-01-01".to_string()),
            location: Some("York".to_string()),
        };
        let out = DataFilter::apply(&df, &filters).unwrap();
        assert!(out.equals(&df));
    }

    #[test]
    fn test_empty_predicate_is_ignored() {
        let filters = FilterOptions {
            date: Some(String::new()),
            location: None,
        };
        let out = DataFilter::apply(&sample(), &filters).unwrap();
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn test_filter_can_empty_the_dataset() {
        let filters = FilterOptions {
            date: Some("1999-12-31".to_string()),
            location: None,
        };
        let out = DataFilter::apply(&sample(), &filters).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.width(), 3);
    }
}
