use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("{0}")]
    Aggregation(String),

    #[error("Table QA error: {0}")]
    TableQa(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, AssistantError>;
