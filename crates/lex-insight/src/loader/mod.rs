//! Dataset loading.
//!
//! The file extension selects the parser: `.csv` files carry a header row and
//! go through the polars CSV reader, `.data` files have no header and are
//! tokenized by [`headerless`]. Extensions are matched case-insensitively and
//! checked before the file is touched.

mod headerless;

use crate::error::{AnalysisError, Result};
use crate::utils::{MISSING_MARKERS, is_numeric_dtype};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Input formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated with a header row.
    HeaderedCsv,
    /// Whitespace- or comma-separated without a header row.
    Headerless,
}

impl SourceFormat {
    /// Select the format from the path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();

        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::HeaderedCsv),
            "data" => Ok(Self::Headerless),
            _ => Err(AnalysisError::UnsupportedFormat(format!(".{}", extension))),
        }
    }
}

/// Loads a tabular file into a DataFrame.
pub struct DataLoader;

impl DataLoader {
    /// Load the file at `path`.
    ///
    /// Missing markers (`NA`, `N/A`, `NaN`, `null`, empty) become nulls.
    /// Columns whose every cell is missing are typed Float64.
    pub fn load(path: &Path) -> Result<DataFrame> {
        let format = SourceFormat::from_path(path)?;
        let shown = path.display().to_string();

        if !path.is_file() {
            return Err(AnalysisError::load(&shown, "file not found"));
        }

        debug!("Loading {} as {:?}", shown, format);

        let df = match format {
            SourceFormat::HeaderedCsv => retype_padded_numbers(Self::load_headered(path)?)?,
            SourceFormat::Headerless => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| AnalysisError::load(&shown, e))?;
                headerless::parse_headerless(&content)
                    .map_err(|reason| AnalysisError::load(&shown, reason))?
            }
        };

        let df = normalize_empty_columns(df)?;
        info!("Loaded {} rows x {} columns", df.height(), df.width());
        Ok(df)
    }

    fn load_headered(path: &Path) -> Result<DataFrame> {
        let shown = path.display().to_string();

        // Standard loading with quote handling, then a plain retry.
        match read_csv(path, Some(b'"')) {
            Ok(df) => Ok(df),
            Err(e) => {
                debug!("Quoted CSV loading failed: {}", e);
                read_csv(path, None).map_err(|e| AnalysisError::load(&shown, e))
            }
        }
    }
}

fn null_markers() -> NullValues {
    let mut markers: Vec<PlSmallStr> = Vec::new();
    for marker in MISSING_MARKERS {
        markers.push(marker.into());
        markers.push(marker.to_ascii_uppercase().into());
    }
    // Mixed-case spellings seen in the wild.
    markers.push("NaN".into());
    markers.push("Null".into());
    markers.push("N/a".into());
    NullValues::AllColumns(markers)
}

fn read_csv(path: &Path, quote_char: Option<u8>) -> PolarsResult<DataFrame> {
    let parse_options = CsvParseOptions::default()
        .with_quote_char(quote_char)
        .with_null_values(Some(null_markers()));

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
}

/// Retype String columns whose cells are all numbers once padding is
/// trimmed (`1, 2` style rows leave `" 2"` as text).
fn retype_padded_numbers(mut df: DataFrame) -> Result<DataFrame> {
    let candidates: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype() == &DataType::String && col.null_count() < col.len())
        .map(|col| col.name().to_string())
        .collect();

    for name in candidates {
        let retyped = {
            let cells: Vec<&str> = df
                .column(&name)?
                .as_materialized_series()
                .str()?
                .into_iter()
                .map(|cell| cell.map_or("", str::trim))
                .collect();
            headerless::infer_column(&name, &cells)
        };

        if is_numeric_dtype(retyped.dtype()) {
            debug!("Column '{}' is numeric after trimming, retyped as {}", name, retyped.dtype());
            df.replace(&name, retyped.take_materialized_series())?;
        }
    }

    Ok(df)
}

/// Retype all-null String columns as Float64 so they count as numeric.
fn normalize_empty_columns(mut df: DataFrame) -> Result<DataFrame> {
    if df.height() == 0 {
        return Ok(df);
    }

    let empty: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype() == &DataType::String && col.null_count() == col.len())
        .map(|col| col.name().to_string())
        .collect();

    for name in empty {
        let series = Series::full_null(name.as_str().into(), df.height(), &DataType::Float64);
        df.replace(&name, series)?;
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a.csv")).unwrap(),
            SourceFormat::HeaderedCsv
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("A.CSV")).unwrap(),
            SourceFormat::HeaderedCsv
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("iris.data")).unwrap(),
            SourceFormat::Headerless
        );
    }

    #[test]
    fn test_unsupported_extension_checked_before_access() {
        let err = DataLoader::load(Path::new("/definitely/not/here.xyz")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: .xyz");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = DataLoader::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::LoadError);
    }

    #[test]
    fn test_load_headered_csv_with_markers() {
        let file = write_temp(".csv", "a,b,name\n1,2.5,x\nNA,3.5,y\n3,,N/A\n");
        let df = DataLoader::load(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
        assert_eq!(df.column("name").unwrap().null_count(), 1);
        assert!(crate::utils::is_numeric_dtype(df.column("a").unwrap().dtype()));
    }

    #[test]
    fn test_load_headerless_data() {
        let file = write_temp(".data", "5.1 3.5 setosa\n4.9 3.0 setosa\n");
        let df = DataLoader::load(file.path()).unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.height(), 2);
        assert!(df.column("col_0").is_ok());
    }

    #[test]
    fn test_spaces_after_commas_stay_numeric() {
        let file = write_temp(".csv", "a,b,label\n1, 2, x\n3, 4.5, y\n5, NA, z\n");
        let df = DataLoader::load(file.path()).unwrap();

        let b = df.column("b").unwrap();
        assert_eq!(b.dtype(), &DataType::Float64);
        assert_eq!(b.null_count(), 1);
        assert_eq!(b.f64().unwrap().get(0), Some(2.0));
        assert_eq!(df.column("label").unwrap().dtype(), &DataType::String);
        assert_eq!(
            df.column("label").unwrap().str().unwrap().get(0),
            Some(" x")
        );
    }

    #[test]
    fn test_only_padded_numeric_columns_load_as_numbers() {
        let file = write_temp(".csv", "a,b\n 1, 2\n 3, 4\n 5, 6\n");
        let df = DataLoader::load(file.path()).unwrap();
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let file = write_temp(".csv", "a,empty\n1,\n2,\n");
        let df = DataLoader::load(file.path()).unwrap();
        assert_eq!(df.column("empty").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("empty").unwrap().null_count(), 2);
    }
}
