//! API key configuration for the hosted collaborators.
//!
//! Keys live in an explicit config object owned by the caller rather than
//! in process-wide state; the CLI resolves flag overrides against this.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// Key for the hosted chat-completion API.
    pub chat_api_key: Option<String>,

    /// Token for the hosted table-QA inference endpoint.
    pub table_qa_token: Option<String>,
}

impl ApiConfig {
    /// Load keys from the process environment, reading a `.env` file first
    /// if one is present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            chat_api_key: env::var("CLAUDE_API_KEY")
                .ok()
                .or_else(|| env::var("ANTHROPIC_API_KEY").ok()),
            table_qa_token: env::var("HF_API_TOKEN").ok(),
        }
    }
}
