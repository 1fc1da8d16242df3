pub mod aggregate;
pub mod answer;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod dispatcher;
pub mod error;
pub mod llm;
pub mod profile;
pub mod table_qa;
