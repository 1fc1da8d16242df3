//! Dataset - in-memory tabular data for one question-answer session
//!
//! Wraps a polars `DataFrame` and exposes the narrow surface the
//! dispatcher needs: column names, missing-value fill, distinct value
//! listing, and row chunking for the table-QA collaborator.

use crate::error::{AssistantError, Result};
use crate::table_qa::TableChunk;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inferred scalar type class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Textual,
    Temporal,
}

/// An in-memory table with named, typed columns. Owned by the session;
/// the dispatcher treats it as read-only and works on copies.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    /// Load a dataset from a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .map_err(|e| {
                AssistantError::Dataset(format!("failed to read {}: {}", path.display(), e))
            })?
            .collect()
            .map_err(|e| {
                AssistantError::Dataset(format!("failed to load {}: {}", path.display(), e))
            })?;
        Ok(Self { df })
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Column names in dataset order. Classification resolves against
    /// this order, first match wins.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn column(&self, name: &str) -> Result<&Series> {
        self.df
            .column(name)
            .map_err(|_| AssistantError::Dataset(format!("no such column: '{}'", name)))
    }

    /// Classify a column as numeric, temporal, or textual. String columns
    /// whose sampled values all parse as dates count as temporal.
    pub fn column_kind(&self, name: &str) -> Result<ColumnKind> {
        let series = self.column(name)?;
        let dtype = series.dtype();
        if dtype.is_numeric() {
            return Ok(ColumnKind::Numeric);
        }
        if matches!(
            dtype,
            DataType::Date | DataType::Datetime(_, _) | DataType::Time | DataType::Duration(_)
        ) {
            return Ok(ColumnKind::Temporal);
        }
        if matches!(dtype, DataType::String) && looks_temporal(series) {
            return Ok(ColumnKind::Temporal);
        }
        Ok(ColumnKind::Textual)
    }

    /// Copy-on-write missing-value fill: string-column nulls become the
    /// empty-string placeholder. Typed numeric/temporal columns keep their
    /// nulls (polars columns cannot hold a string placeholder); those are
    /// skipped by aggregations and stringified as "" in QA chunks.
    pub fn fill_missing(&self) -> Result<Dataset> {
        let exprs: Vec<Expr> = self
            .df
            .get_columns()
            .iter()
            .filter(|series| matches!(series.dtype(), DataType::String))
            .map(|series| col(series.name()).fill_null(lit("")))
            .collect();
        if exprs.is_empty() {
            return Ok(self.clone());
        }
        let df = self.df.clone().lazy().with_columns(exprs).collect()?;
        Ok(Self { df })
    }

    /// Distinct non-null values of a column in first-occurrence order.
    pub fn column_values(&self, name: &str) -> Result<Vec<String>> {
        let series = self.column(name)?;
        let unique = series.unique_stable()?;
        let mut values = Vec::with_capacity(unique.len());
        for value in unique.iter() {
            if matches!(value, AnyValue::Null) {
                continue;
            }
            values.push(any_value_to_string(&value));
        }
        Ok(values)
    }

    /// Split the dataset into row chunks of at most `chunk_size` rows,
    /// each converted to an all-string representation for the table-QA
    /// collaborator. A dataset that already fits is a single chunk.
    pub fn chunks(&self, chunk_size: usize) -> Result<Vec<TableChunk>> {
        if chunk_size == 0 {
            return Err(AssistantError::Dataset(
                "chunk size must be positive".to_string(),
            ));
        }
        let names = self.column_names();
        let height = self.height();
        if height <= chunk_size {
            return Ok(vec![chunk_from_frame(&self.df, &names)?]);
        }
        let mut chunks = Vec::with_capacity(height.div_ceil(chunk_size));
        let mut offset = 0usize;
        while offset < height {
            let len = chunk_size.min(height - offset);
            let slice = self.df.slice(offset as i64, len);
            chunks.push(chunk_from_frame(&slice, &names)?);
            offset += len;
        }
        Ok(chunks)
    }
}

fn chunk_from_frame(df: &DataFrame, names: &[String]) -> Result<TableChunk> {
    let mut cells = Vec::with_capacity(names.len());
    for name in names {
        let series = df.column(name)?;
        let mut column = Vec::with_capacity(df.height());
        for value in series.iter() {
            column.push(any_value_to_string(&value));
        }
        cells.push(column);
    }
    Ok(TableChunk::new(names.to_vec(), cells))
}

fn looks_temporal(series: &Series) -> bool {
    const SAMPLE: usize = 10;
    const FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

    let Ok(ca) = series.str() else {
        return false;
    };
    let mut seen = 0usize;
    for value in ca.into_iter().flatten() {
        if value.trim().is_empty() {
            continue;
        }
        if !FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        {
            return false;
        }
        seen += 1;
        if seen >= SAMPLE {
            break;
        }
    }
    seen > 0
}

/// Stringify a single cell value. Nulls become the empty string so that
/// downstream trimming drops them.
pub(crate) fn any_value_to_string(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => v.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        other => format!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_dataset() -> Dataset {
        let df = df![
            "Category" => ["A", "A", "B", "B"],
            "Sales" => [100i64, 200, 150, 250]
        ]
        .unwrap();
        Dataset::new(df)
    }

    #[test]
    fn test_column_names_in_order() {
        let dataset = sales_dataset();
        assert_eq!(dataset.column_names(), vec!["Category", "Sales"]);
    }

    #[test]
    fn test_fill_missing_replaces_string_nulls_without_mutating_source() {
        let series = Series::new("City", &[Some("Paris"), None, Some("Lyon")]);
        let dataset = Dataset::new(DataFrame::new(vec![series]).unwrap());

        let filled = dataset.fill_missing().unwrap();
        assert_eq!(filled.column("City").unwrap().null_count(), 0);
        assert_eq!(
            filled.column_values("City").unwrap(),
            vec!["Paris", "", "Lyon"]
        );

        // The source dataset still has its null.
        assert_eq!(dataset.column("City").unwrap().null_count(), 1);
    }

    #[test]
    fn test_column_values_distinct_first_occurrence() {
        let dataset = sales_dataset();
        assert_eq!(dataset.column_values("Category").unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_column_values_skips_nulls() {
        let series = Series::new("City", &[Some("Paris"), None, Some("Paris")]);
        let dataset = Dataset::new(DataFrame::new(vec![series]).unwrap());
        assert_eq!(dataset.column_values("City").unwrap(), vec!["Paris"]);
    }

    #[test]
    fn test_chunks_small_dataset_is_single_chunk() {
        let dataset = sales_dataset();
        let chunks = dataset.chunks(50).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].height(), 4);
    }

    #[test]
    fn test_chunks_split_with_smaller_tail() {
        let ids: Vec<i64> = (0..120).collect();
        let dataset = Dataset::new(df!["id" => ids].unwrap());
        let chunks = dataset.chunks(50).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(|c| c.height()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
    }

    #[test]
    fn test_chunks_stringify_cells() {
        let dataset = sales_dataset();
        let chunks = dataset.chunks(50).unwrap();
        let chunk = &chunks[0];
        assert_eq!(
            chunk.cell(crate::table_qa::CellCoord { row: 0, column: 1 }),
            "100"
        );
        assert_eq!(
            chunk.cell(crate::table_qa::CellCoord { row: 3, column: 0 }),
            "B"
        );
    }

    #[test]
    fn test_column_kind_numeric_and_textual() {
        let dataset = sales_dataset();
        assert_eq!(dataset.column_kind("Sales").unwrap(), ColumnKind::Numeric);
        assert_eq!(dataset.column_kind("Category").unwrap(), ColumnKind::Textual);
    }

    #[test]
    fn test_column_kind_sniffs_dates_in_string_columns() {
        let df = df!["as_of_date" => ["2025-01-15", "2025-02-20"]].unwrap();
        let dataset = Dataset::new(df);
        assert_eq!(
            dataset.column_kind("as_of_date").unwrap(),
            ColumnKind::Temporal
        );
    }
}
