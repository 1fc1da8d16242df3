//! Query dispatcher - routes a natural-language question over a dataset
//!
//! One dispatch call fully resolves one question: validate, fill missing
//! values on a working copy, classify into an intent, then either execute
//! the intent deterministically or fall back to the table-QA collaborator
//! chunk by chunk. Expected-input failures never cross the dispatch
//! boundary as errors; they degrade to informational answer strings.

use crate::aggregate;
use crate::answer::{format_answers, Answer};
use crate::classifier::{classify, validate_question, Intent};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::table_qa::TableQa;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_CHUNK_SIZE: usize = 50;
pub const NO_ANSWER_MESSAGE: &str = "Could not find an answer in the table.";

pub struct QueryDispatcher {
    table_qa: Arc<dyn TableQa>,
    chunk_size: usize,
}

impl QueryDispatcher {
    pub fn new(table_qa: Arc<dyn TableQa>) -> Self {
        Self {
            table_qa,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Resolve one question against one dataset.
    ///
    /// Returns `Ok(None)` when the question fails validation; the caller
    /// must prompt the user again without touching the dataset. All
    /// expected failure paths inside classification and execution come
    /// back as `Ok(Some(answer))` carrying an informational string.
    pub async fn dispatch(&self, question: &str, dataset: &Dataset) -> Result<Option<Answer>> {
        if !validate_question(question) {
            warn!("rejected empty question");
            return Ok(None);
        }

        let working = dataset.fill_missing()?;
        let intent = classify(question, &working);
        debug!(?intent, "classified question");

        let answer = match intent {
            Intent::GroupAggregation {
                operation,
                measure,
                group_by,
            } => {
                info!(
                    op = operation.as_str(),
                    measure = %measure,
                    group = %group_by,
                    "running grouped aggregation"
                );
                match aggregate::grouped(working.df(), operation, &measure, &group_by) {
                    Ok(text) => Answer::text(text),
                    Err(e) => Answer::text(format!("Error in aggregation: {}", e)),
                }
            }
            Intent::Aggregation { operation, column } => {
                info!(op = operation.as_str(), column = %column, "running aggregation");
                match aggregate::simple(working.df(), operation, &column) {
                    Ok(text) => Answer::text(text),
                    Err(e) => Answer::text(format!("Error in aggregation: {}", e)),
                }
            }
            Intent::ColumnListing { column } => {
                info!(column = %column, "listing column values");
                format_answers(working.column_values(&column)?)
            }
            Intent::Default => self.fallback(question, &working).await?,
        };

        Ok(Some(answer))
    }

    /// Chunked table-QA fallback: each chunk is sent serially with the
    /// original question; a chunk that fails is skipped, not fatal.
    async fn fallback(&self, question: &str, dataset: &Dataset) -> Result<Answer> {
        let chunks = dataset.chunks(self.chunk_size)?;
        info!(
            chunks = chunks.len(),
            "no structured intent matched, falling back to table QA"
        );

        let mut collected = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            match self.table_qa.answer(chunk, question).await {
                Ok(coords) => {
                    for coord in coords {
                        let value = chunk.cell(coord).trim();
                        if !value.is_empty() {
                            collected.push(value.to_string());
                        }
                    }
                }
                Err(e) => {
                    warn!(chunk = idx, "table QA failed for chunk: {}", e);
                    continue;
                }
            }
        }

        if collected.is_empty() {
            return Ok(Answer::text(NO_ANSWER_MESSAGE));
        }
        Ok(format_answers(collected))
    }
}
