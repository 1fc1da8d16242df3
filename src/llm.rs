//! Hosted chat-completion collaborator for free-form dataset questions
//!
//! This is the non-core "insight" path: questions the dispatcher does not
//! handle structurally can be sent to the hosted model together with a
//! compact description of the dataset.

use crate::dataset::Dataset;
use crate::error::{AssistantError, Result};

pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const SAMPLE_ROWS: usize = 5;

#[derive(Clone)]
pub struct LlmClient {
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Answer a free-form question about the dataset using the hosted
    /// model, passing shape, column names, and a head sample as context.
    pub async fn ask_about_dataset(&self, question: &str, dataset: &Dataset) -> Result<String> {
        let prompt = build_dataset_prompt(question, dataset);
        self.call_llm(&prompt).await
    }

    async fn call_llm(&self, prompt: &str) -> Result<String> {
        let client = reqwest::Client::new();
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let response = client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Llm(format!("LLM API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AssistantError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        if let Some(error) = response_json.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(AssistantError::Llm(format!("LLM API error: {}", message)));
        }

        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| AssistantError::Llm("No content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}

fn build_dataset_prompt(question: &str, dataset: &Dataset) -> String {
    format!(
        r#"Here is information about the dataset:
- Shape: ({rows}, {cols})
- Columns: {columns}
- Sample data:
{sample}

Question: {question}

Please provide a clear and concise answer based on the data provided."#,
        rows = dataset.height(),
        cols = dataset.width(),
        columns = dataset.column_names().join(", "),
        sample = dataset.df().head(Some(SAMPLE_ROWS)),
        question = question,
    )
}
