//! Configuration types for the analysis pipeline.
//!
//! Cleaning and filter options arrive from the host as JSON objects with
//! camelCase keys. Only the recognised keys are read; anything else is
//! ignored, and every option defaults to off/absent.

use serde::{Deserialize, Serialize};

/// Default number of histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Default multiplier applied to the interquartile range.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Recognised cleaning operations. Applied in field order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleaningOptions {
    /// Drop rows that exactly repeat an earlier row (first occurrence wins).
    pub remove_duplicates: bool,
    /// Forward-fill missing cells from the nearest preceding value.
    pub handle_missing: bool,
    /// Normalise a `date` column to ISO 8601 and a `zip` column to 5 digits.
    pub standardize_formats: bool,
}

impl CleaningOptions {
    /// Keys understood by [`CleaningOptions`] when read from JSON.
    pub const KNOWN_KEYS: [&'static str; 3] =
        ["removeDuplicates", "handleMissing", "standardizeFormats"];

    /// True when no cleaning operation is enabled.
    pub fn is_noop(&self) -> bool {
        !(self.remove_duplicates || self.handle_missing || self.standardize_formats)
    }
}

/// Recognised row filters. Both apply (logical AND) when supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    /// Keep rows whose `date` column equals this text exactly.
    pub date: Option<String>,
    /// Keep rows whose `location` column contains this text (case-insensitive).
    pub location: Option<String>,
}

impl FilterOptions {
    /// Keys understood by [`FilterOptions`] when read from JSON.
    pub const KNOWN_KEYS: [&'static str; 2] = ["date", "location"];

    /// Date predicate, ignoring empty text.
    pub fn date_predicate(&self) -> Option<&str> {
        self.date.as_deref().filter(|s| !s.is_empty())
    }

    /// Location predicate, ignoring empty text.
    pub fn location_predicate(&self) -> Option<&str> {
        self.location.as_deref().filter(|s| !s.is_empty())
    }
}

/// Full configuration for one analysis run.
///
/// Use [`AnalysisConfig::builder()`] to create a configuration with the
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_insight::config::{AnalysisConfig, CleaningOptions};
///
/// let config = AnalysisConfig::builder()
///     .cleaning(CleaningOptions { remove_duplicates: true, ..Default::default() })
///     .histogram_bins(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cleaning operations to apply after loading.
    /// Default: all off
    pub cleaning: CleaningOptions,

    /// Row filters to apply after cleaning.
    /// Default: none
    pub filters: FilterOptions,

    /// Number of equal-width bins in the histogram.
    /// Default: 30
    pub histogram_bins: usize,

    /// Multiplier applied to the IQR when computing outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cleaning: CleaningOptions::default(),
            filters: FilterOptions::default(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidBins(self.histogram_bins));
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(
                self.iqr_multiplier,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid histogram bin count: {0} (must be at least 1)")]
    InvalidBins(usize),

    #[error("Invalid IQR multiplier: {0} (must be a positive number)")]
    InvalidMultiplier(f64),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    cleaning: Option<CleaningOptions>,
    filters: Option<FilterOptions>,
    histogram_bins: Option<usize>,
    iqr_multiplier: Option<f64>,
}

impl AnalysisConfigBuilder {
    /// Set the cleaning operations.
    pub fn cleaning(mut self, cleaning: CleaningOptions) -> Self {
        self.cleaning = Some(cleaning);
        self
    }

    /// Set the row filters.
    pub fn filters(mut self, filters: FilterOptions) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the IQR multiplier used for outlier bounds.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let config = AnalysisConfig {
            cleaning: self.cleaning.unwrap_or_default(),
            filters: self.filters.unwrap_or_default(),
            histogram_bins: self.histogram_bins.unwrap_or(DEFAULT_HISTOGRAM_BINS),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(DEFAULT_IQR_MULTIPLIER),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert!(config.cleaning.is_noop());
        assert_eq!(config.filters, FilterOptions::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .cleaning(CleaningOptions {
                remove_duplicates: true,
                ..Default::default()
            })
            .histogram_bins(10)
            .iqr_multiplier(3.0)
            .build()
            .unwrap();

        assert!(config.cleaning.remove_duplicates);
        assert!(!config.cleaning.handle_missing);
        assert_eq!(config.histogram_bins, 10);
        assert_eq!(config.iqr_multiplier, 3.0);
    }

    #[test]
    fn test_validation_invalid_bins() {
        let result = AnalysisConfig::builder().histogram_bins(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidBins(0)
        ));
    }

    #[test]
    fn test_validation_invalid_multiplier() {
        let result = AnalysisConfig::builder().iqr_multiplier(-1.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidMultiplier(_)
        ));

        let result = AnalysisConfig::builder().iqr_multiplier(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_cleaning_options_from_host_json() {
        let json = r#"{"removeDuplicates": true, "standardizeFormats": true}"#;
        let options: CleaningOptions = serde_json::from_str(json).unwrap();

        assert!(options.remove_duplicates);
        assert!(!options.handle_missing);
        assert!(options.standardize_formats);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let json = r#"{"handleMissing": true, "dropEverything": true}"#;
        let options: CleaningOptions = serde_json::from_str(json).unwrap();
        assert!(options.handle_missing);
        assert!(!options.remove_duplicates);

        let json = r#"{"location": "York", "region": "north"}"#;
        let filters: FilterOptions = serde_json::from_str(json).unwrap();
        assert_eq!(filters.location_predicate(), Some("York"));
        assert_eq!(filters.date_predicate(), None);
    }

    #[test]
    fn test_empty_filter_text_is_not_a_predicate() {
        let filters = FilterOptions {
            date: Some(String::new()),
            location: Some("x".to_string()),
        };
        assert_eq!(filters.date_predicate(), None);
        assert_eq!(filters.location_predicate(), Some("x"));
    }

    #[test]
    fn test_empty_json_object_gives_defaults() {
        let options: CleaningOptions = serde_json::from_str("{}").unwrap();
        assert!(options.is_noop());
        let filters: FilterOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(filters, FilterOptions::default());
    }
}
