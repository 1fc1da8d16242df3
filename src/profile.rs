//! Dataset profiling - overview statistics for an uploaded dataset

use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub missing: usize,
    pub unique: usize,
    /// Present for numeric columns only.
    pub numeric: Option<NumericSummary>,
}

/// Basic information about a dataset: shape, missing values, and
/// per-column type/missing/unique counts with a numeric summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    pub missing_values: usize,
    pub profiles: Vec<ColumnProfile>,
}

impl DatasetProfile {
    pub fn build(dataset: &Dataset) -> Result<Self> {
        let mut profiles = Vec::with_capacity(dataset.width());
        let mut missing_values = 0usize;

        for name in dataset.column_names() {
            let series = dataset.column(&name)?;
            let missing = series.null_count();
            missing_values += missing;

            let numeric = if series.dtype().is_numeric() {
                let cast = series.cast(&DataType::Float64)?;
                let values = cast.f64()?;
                Some(NumericSummary {
                    count: values.len() - values.null_count(),
                    mean: values.mean().unwrap_or(0.0),
                    std: values.std(1).unwrap_or(0.0),
                    min: values.min().unwrap_or(0.0),
                    max: values.max().unwrap_or(0.0),
                })
            } else {
                None
            };

            profiles.push(ColumnProfile {
                dtype: series.dtype().to_string(),
                kind: dataset.column_kind(&name)?,
                missing,
                unique: series.n_unique()?,
                numeric,
                name,
            });
        }

        Ok(Self {
            rows: dataset.height(),
            columns: dataset.width(),
            missing_values,
            profiles,
        })
    }

    /// Plain-text rendering for the CLI.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Dataset overview: {} rows x {} columns, {} missing values\n\n",
            self.rows, self.columns, self.missing_values
        ));
        out.push_str("Columns:\n");
        for profile in &self.profiles {
            out.push_str(&format!(
                "  {} ({}, {:?}): {} missing, {} unique\n",
                profile.name,
                profile.dtype,
                profile.kind,
                profile.missing,
                profile.unique
            ));
        }

        let numeric: Vec<&ColumnProfile> =
            self.profiles.iter().filter(|p| p.numeric.is_some()).collect();
        if !numeric.is_empty() {
            out.push_str("\nNumeric columns:\n");
            for profile in numeric {
                if let Some(summary) = &profile.numeric {
                    out.push_str(&format!(
                        "  {}: count={} mean={:.2} std={:.2} min={:.2} max={:.2}\n",
                        profile.name,
                        summary.count,
                        summary.mean,
                        summary.std,
                        summary.min,
                        summary.max
                    ));
                }
            }
        }
        out
    }
}
