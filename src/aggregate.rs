//! Deterministic aggregation execution and answer-value formatting
//!
//! Aggregations run as polars lazy expressions over the working copy of
//! the dataset. Columns whose name contains "amount" or "price" format as
//! currency; the heuristic has no configuration surface on purpose.

use crate::classifier::AggregateOp;
use crate::dataset::any_value_to_string;
use crate::error::{AssistantError, Result};
use polars::prelude::*;

const AGG_ALIAS: &str = "__agg";

/// Aggregate a single column without grouping and format the result.
///
/// `count` is the row count of the whole dataset; `min`/`max` stringify
/// the raw value with no special formatting.
pub fn simple(df: &DataFrame, operation: AggregateOp, column: &str) -> Result<String> {
    match operation {
        AggregateOp::Count => Ok(df.height().to_string()),
        AggregateOp::Sum => {
            let value = numeric_agg(df, operation, column)?;
            Ok(if is_currency_column(column) {
                format_currency(value)
            } else {
                format_with_separators(value, 0)
            })
        }
        AggregateOp::Mean => {
            let value = numeric_agg(df, operation, column)?;
            Ok(if is_currency_column(column) {
                format_currency(value)
            } else {
                format!("{:.2}", value)
            })
        }
        AggregateOp::Min | AggregateOp::Max => {
            let out = df
                .clone()
                .lazy()
                .select([agg_expr(operation, column)])
                .collect()?;
            let series = out.get_columns().first().ok_or_else(|| {
                AssistantError::Aggregation(format!(
                    "no result for {} of '{}'",
                    operation.as_str(),
                    column
                ))
            })?;
            let value = series.iter().next().ok_or_else(|| {
                AssistantError::Aggregation(format!(
                    "column '{}' has no values to aggregate",
                    column
                ))
            })?;
            Ok(any_value_to_string(&value))
        }
    }
}

/// Aggregate a measure column per distinct group value. Group order is the
/// first-seen order of the group column; each line renders as
/// `"<group>: <formatted value>"`, newline-joined.
pub fn grouped(
    df: &DataFrame,
    operation: AggregateOp,
    measure: &str,
    group_by: &str,
) -> Result<String> {
    if matches!(operation, AggregateOp::Sum | AggregateOp::Mean) {
        ensure_numeric(df, measure)?;
    }
    let out = df
        .clone()
        .lazy()
        .group_by_stable([col(group_by)])
        .agg([agg_expr(operation, measure).alias(AGG_ALIAS)])
        .collect()?;

    let groups = out.column(group_by)?;
    let cast = out.column(AGG_ALIAS)?.cast(&DataType::Float64).map_err(|_| {
        AssistantError::Aggregation(format!(
            "cannot compute {} of non-numeric column '{}'",
            operation.as_str(),
            measure
        ))
    })?;
    let values = cast.f64()?;
    let currency = is_currency_column(measure);

    let mut lines = Vec::with_capacity(out.height());
    for (idx, group) in groups.iter().enumerate() {
        let value = values.get(idx).ok_or_else(|| {
            AssistantError::Aggregation(format!(
                "no {} for group '{}'",
                operation.as_str(),
                any_value_to_string(&group)
            ))
        })?;
        let formatted = if currency {
            format_currency(value)
        } else {
            format!("{:.2}", value)
        };
        lines.push(format!("{}: {}", any_value_to_string(&group), formatted));
    }
    Ok(lines.join("\n"))
}

fn numeric_agg(df: &DataFrame, operation: AggregateOp, column: &str) -> Result<f64> {
    ensure_numeric(df, column)?;
    let out = df
        .clone()
        .lazy()
        .select([agg_expr(operation, column)])
        .collect()?;
    let series = out.get_columns().first().ok_or_else(|| {
        AssistantError::Aggregation(format!(
            "no result for {} of '{}'",
            operation.as_str(),
            column
        ))
    })?;
    let cast = series.cast(&DataType::Float64)?;
    cast.f64()?.get(0).ok_or_else(|| {
        AssistantError::Aggregation(format!("column '{}' has no values to aggregate", column))
    })
}

fn ensure_numeric(df: &DataFrame, column: &str) -> Result<()> {
    let series = df.column(column)?;
    if !series.dtype().is_numeric() {
        return Err(AssistantError::Aggregation(format!(
            "column '{}' is not numeric ({})",
            column,
            series.dtype()
        )));
    }
    Ok(())
}

fn agg_expr(operation: AggregateOp, column: &str) -> Expr {
    match operation {
        AggregateOp::Sum => col(column).sum(),
        AggregateOp::Mean => col(column).mean(),
        AggregateOp::Count => col(column).count(),
        AggregateOp::Min => col(column).min(),
        AggregateOp::Max => col(column).max(),
    }
}

/// Currency formatting applies when the column name contains "amount" or
/// "price", case-insensitively.
fn is_currency_column(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("amount") || name.contains("price")
}

fn format_currency(value: f64) -> String {
    format!("${}", format_with_separators(value, 2))
}

/// Fixed-decimal rendering with thousands separators in the integer part.
fn format_with_separators(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value);
    let (sign, rest) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
