use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategoryAgentError {
    #[error("Category path not found: {path}")]
    CategoryNotFound { path: String },

    #[error("Taxonomy file does not exist: {path}")]
    TaxonomyNotFound { path: PathBuf },

    #[error("Taxonomy file contains no category paths: {path}")]
    EmptyTaxonomy { path: PathBuf },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("Claude CLI not found. Install it or switch llm.backend to 'openai'")]
    ClaudeNotFound,

    #[error("Claude execution failed: {message}")]
    ClaudeExecutionFailed { message: String },

    #[error("API key not set: export {var} or add it to .env")]
    MissingApiKey { var: String },

    #[error("LLM request failed: {0}")]
    LlmRequest(String),

    #[error("Malformed decision from LLM: {message}")]
    MalformedResponse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Home directory not found")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, CategoryAgentError>;

impl CategoryAgentError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CategoryNotFound { .. } => 2,
            Self::TaxonomyNotFound { .. } | Self::EmptyTaxonomy { .. } => 3,
            Self::ConfigParse { .. }
            | Self::ConfigKeyNotFound { .. }
            | Self::InvalidConfigValue { .. } => 4,
            Self::ClaudeNotFound | Self::MissingApiKey { .. } => 5,
            _ => 1,
        }
    }
}
