//! Table-QA collaborator - cell-coordinate question answering over chunks
//!
//! The dispatcher hands the collaborator one row chunk at a time together
//! with the original question and gets back the coordinates of answer
//! cells. Lookup is bounds-checked: an out-of-range coordinate resolves
//! to the empty string, never an error.

use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Model the hosted inference endpoint serves by default.
pub const DEFAULT_QA_MODEL: &str = "google/tapas-base-finetuned-wtq";

/// Row/column coordinates of one answer cell within a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub column: usize,
}

/// A row-bounded slice of the dataset converted to string cells, stored
/// column-major to match the collaborator's table payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChunk {
    columns: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl TableChunk {
    pub fn new(columns: Vec<String>, cells: Vec<Vec<String>>) -> Self {
        Self { columns, cells }
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Bounds-checked cell lookup; out-of-range coordinates yield "".
    pub fn cell(&self, coord: CellCoord) -> &str {
        self.cells
            .get(coord.column)
            .and_then(|column| column.get(coord.row))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// The external table-QA model boundary.
#[async_trait]
pub trait TableQa: Send + Sync {
    /// Answer a question over one chunk, returning the coordinates of the
    /// answer cells. An empty result means the model found nothing in
    /// this chunk.
    async fn answer(&self, chunk: &TableChunk, question: &str) -> Result<Vec<CellCoord>>;
}

/// Hosted table-QA implementation calling the inference endpoint for a
/// pretrained table-question-answering model.
pub struct HostedTableQa {
    endpoint: String,
    api_token: String,
    client: reqwest::Client,
}

impl HostedTableQa {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            endpoint: format!(
                "https://api-inference.huggingface.co/models/{}",
                DEFAULT_QA_MODEL
            ),
            api_token: api_token.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TableQa for HostedTableQa {
    async fn answer(&self, chunk: &TableChunk, question: &str) -> Result<Vec<CellCoord>> {
        let mut table = Map::new();
        for (idx, name) in chunk.column_names().iter().enumerate() {
            let values: Vec<Value> = (0..chunk.height())
                .map(|row| Value::String(chunk.cell(CellCoord { row, column: idx }).to_string()))
                .collect();
            table.insert(name.clone(), Value::Array(values));
        }
        let body = json!({
            "inputs": {
                "query": question,
                "table": table
            }
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if !self.api_token.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::TableQa(format!("table QA call failed: {}", e)))?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| AssistantError::TableQa(format!("failed to parse table QA response: {}", e)))?;

        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            return Err(AssistantError::TableQa(format!(
                "table QA model error: {}",
                message
            )));
        }

        let coords: Vec<CellCoord> = payload
            .get("coordinates")
            .and_then(Value::as_array)
            .map(|pairs| {
                pairs
                    .iter()
                    .filter_map(|pair| {
                        let pair = pair.as_array()?;
                        let row = pair.first()?.as_u64()? as usize;
                        let column = pair.get(1)?.as_u64()? as usize;
                        Some(CellCoord { row, column })
                    })
                    .collect()
            })
            .unwrap_or_default();
        debug!(count = coords.len(), "table QA chunk answered");
        Ok(coords)
    }
}
