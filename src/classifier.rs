//! Question classification - ordered keyword/regex rules over column names
//!
//! Classification runs a fixed-priority rule list: grouped aggregation,
//! then simple aggregation, then column listing; the first rule that
//! matches wins and later rules are never attempted. A rule that cannot
//! resolve its column references declines the match instead of claiming
//! a structured intent.

use crate::dataset::Dataset;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl AggregateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "sum",
            AggregateOp::Mean => "mean",
            AggregateOp::Count => "count",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "sum" => Some(AggregateOp::Sum),
            "average" | "mean" => Some(AggregateOp::Mean),
            "count" => Some(AggregateOp::Count),
            "min" => Some(AggregateOp::Min),
            "max" => Some(AggregateOp::Max),
            _ => None,
        }
    }
}

/// Classified structured meaning of a question. Column fields always hold
/// resolved column names of the target dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    GroupAggregation {
        operation: AggregateOp,
        measure: String,
        group_by: String,
    },
    Aggregation {
        operation: AggregateOp,
        column: String,
    },
    ColumnListing {
        column: String,
    },
    Default,
}

lazy_static! {
    static ref GROUP_AGG_PATTERN: Regex =
        Regex::new(r"(average|mean|sum|count|min|max) of (\w+) by (\w+)").unwrap();
}

/// Operation keyword sets, checked in this order. Matching is plain
/// substring search over the lowercased question.
const AGGREGATION_KEYWORDS: &[(AggregateOp, &[&str])] = &[
    (AggregateOp::Sum, &["sum of", "total", "sum"]),
    (AggregateOp::Mean, &["average", "mean", "avg"]),
    (AggregateOp::Count, &["count", "how many", "number of"]),
    (AggregateOp::Min, &["minimum", "min", "lowest"]),
    (AggregateOp::Max, &["maximum", "max", "highest"]),
];

const LISTING_KEYWORDS: &[&str] = &[
    "show",
    "list",
    "what are",
    "display",
    "give me",
    "what is in",
];

type Rule = fn(&str, &[String]) -> Option<Intent>;

/// Rules in priority order; the first that matches wins.
const RULES: &[Rule] = &[match_group_aggregation, match_aggregation, match_listing];

/// A question must carry at least one non-whitespace character.
pub fn validate_question(question: &str) -> bool {
    !question.trim().is_empty()
}

pub fn classify(question: &str, dataset: &Dataset) -> Intent {
    let question = question.to_lowercase();
    let columns = dataset.column_names();
    for rule in RULES {
        if let Some(intent) = rule(&question, &columns) {
            return intent;
        }
    }
    Intent::Default
}

fn match_group_aggregation(question: &str, columns: &[String]) -> Option<Intent> {
    let caps = GROUP_AGG_PATTERN.captures(question)?;
    let operation = AggregateOp::from_keyword(caps.get(1)?.as_str())?;
    let measure = resolve_normalized(caps.get(2)?.as_str(), columns)?;
    let group_by = resolve_normalized(caps.get(3)?.as_str(), columns)?;
    Some(Intent::GroupAggregation {
        operation,
        measure,
        group_by,
    })
}

fn match_aggregation(question: &str, columns: &[String]) -> Option<Intent> {
    for (operation, keywords) in AGGREGATION_KEYWORDS {
        if !keywords.iter().any(|kw| question.contains(kw)) {
            continue;
        }
        if let Some(column) = find_verbatim_column(question, columns) {
            return Some(Intent::Aggregation {
                operation: *operation,
                column,
            });
        }
        // Operation matched but no column did; try the next operation.
    }
    None
}

fn match_listing(question: &str, columns: &[String]) -> Option<Intent> {
    if !LISTING_KEYWORDS.iter().any(|kw| question.contains(kw)) {
        return None;
    }
    let column = find_verbatim_column(question, columns)?;
    Some(Intent::ColumnListing { column })
}

/// First column (in dataset order) whose lowercase name appears verbatim
/// in the lowercased question.
fn find_verbatim_column(question: &str, columns: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|column| question.contains(column.to_lowercase().as_str()))
        .cloned()
}

fn normalize(name: &str) -> String {
    name.to_lowercase().replace('_', "")
}

/// Resolve a question token against column names after normalization
/// (lowercase, underscores stripped). The token may contain the column
/// name or be contained in it; first match in column order wins. This can
/// bind to the wrong column when names share substrings - known behavior,
/// kept as-is.
fn resolve_normalized(token: &str, columns: &[String]) -> Option<String> {
    let token = normalize(token);
    columns
        .iter()
        .find(|column| {
            let name = normalize(column);
            name.contains(&token) || token.contains(&name)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sales_dataset() -> Dataset {
        let df = df![
            "Category" => ["A", "A", "B", "B"],
            "Sales" => [100i64, 200, 150, 250]
        ]
        .unwrap();
        Dataset::new(df)
    }

    #[test]
    fn test_validate_question() {
        assert!(!validate_question(""));
        assert!(!validate_question("   \t"));
        assert!(validate_question("sum of Sales"));
    }

    #[test]
    fn test_classify_simple_aggregation() {
        let intent = classify("sum of Sales", &sales_dataset());
        assert_eq!(
            intent,
            Intent::Aggregation {
                operation: AggregateOp::Sum,
                column: "Sales".to_string()
            }
        );
    }

    #[test]
    fn test_classify_grouped_aggregation() {
        let intent = classify("average of Sales by Category", &sales_dataset());
        assert_eq!(
            intent,
            Intent::GroupAggregation {
                operation: AggregateOp::Mean,
                measure: "Sales".to_string(),
                group_by: "Category".to_string()
            }
        );
    }

    #[test]
    fn test_grouped_rule_wins_over_simple_aggregation() {
        // Matches both the grouped pattern and the "sum" keyword set; the
        // grouped rule runs first.
        let intent = classify("sum of Sales by Category", &sales_dataset());
        assert!(matches!(intent, Intent::GroupAggregation { .. }));
    }

    #[test]
    fn test_grouped_resolution_strips_underscores() {
        let df = df![
            "Region_Name" => ["N", "S"],
            "Total_Sales" => [10i64, 20]
        ]
        .unwrap();
        let intent = classify("sum of total_sales by region_name", &Dataset::new(df));
        assert_eq!(
            intent,
            Intent::GroupAggregation {
                operation: AggregateOp::Sum,
                measure: "Total_Sales".to_string(),
                group_by: "Region_Name".to_string()
            }
        );
    }

    #[test]
    fn test_unresolved_group_columns_fall_through() {
        // The grouped pattern matches textually but neither token resolves
        // to a column, so classification falls through to the next rules
        // and ends at Default.
        let intent = classify("sum of revenue by region", &sales_dataset());
        assert_eq!(intent, Intent::Default);
    }

    #[test]
    fn test_aggregation_keyword_without_column_falls_through() {
        let intent = classify("what is the total?", &sales_dataset());
        assert_eq!(intent, Intent::Default);
    }

    #[test]
    fn test_classify_column_listing() {
        let intent = classify("list the values in Category", &sales_dataset());
        assert_eq!(
            intent,
            Intent::ColumnListing {
                column: "Category".to_string()
            }
        );
    }

    #[test]
    fn test_listing_requires_keyword() {
        // Column name present but no listing keyword and no aggregation
        // keyword.
        let intent = classify("tell me about Category", &sales_dataset());
        assert_eq!(intent, Intent::Default);
    }

    #[test]
    fn test_first_column_in_order_wins() {
        let df = df![
            "Sales" => [1i64, 2],
            "Sales_Target" => [3i64, 4]
        ]
        .unwrap();
        // Both column names appear in the question; dataset order decides.
        let intent = classify("sum of sales_target and sales", &Dataset::new(df));
        assert_eq!(
            intent,
            Intent::Aggregation {
                operation: AggregateOp::Sum,
                column: "Sales".to_string()
            }
        );
    }

    #[test]
    fn test_classify_default_for_free_form_question() {
        let intent = classify("which city had the best quarter?", &sales_dataset());
        assert_eq!(intent, Intent::Default);
    }
}
