//! LLM Integration Module
//!
//! 意思決定を委ねる言語モデルへの通信手段を提供する。
//!
//! - `claude`: Claude CLI（`claude --print`）経由
//! - `openai`: OpenAI互換の`/v1/chat/completions`エンドポイント経由
//!
//! ## 使用方法
//!
//! ```rust
//! use category_agent_core::llm::{LlmBackend, LlmConfig};
//!
//! let config = LlmConfig::default();
//! assert_eq!(config.backend, LlmBackend::Claude);
//! assert_eq!(config.resolved_model(), None);
//! ```

mod claude;
mod openai;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CategoryAgentError;

pub use claude::{check_claude_cli, execute_claude, execute_claude_async, require_claude_cli};
pub(crate) use claude::{run_claude, run_claude_async};
pub use openai::OpenAiClient;

/// OpenAIバックエンドの既定モデル
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

// ============================================================================
// Configuration
// ============================================================================

/// 使用するLLMバックエンド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Claude,
    OpenAi,
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claude => f.write_str("claude"),
            Self::OpenAi => f.write_str("openai"),
        }
    }
}

impl FromStr for LlmBackend {
    type Err = CategoryAgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "openai" => Ok(Self::OpenAi),
            _ => Err(CategoryAgentError::InvalidConfigValue {
                key: "llm.backend".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// LLM機能の設定（`config.toml`の`[llm]`セクション）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: LlmBackend,

    /// モデル名（未指定ならバックエンドの既定）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// APIキーを読む環境変数名
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            temperature: 0.0,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            api_base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmConfig {
    /// 実際に使うモデル名
    ///
    /// Claude CLIはモデル未指定ならCLI側の既定を使うため`None`のまま。
    pub fn resolved_model(&self) -> Option<&str> {
        match (&self.model, self.backend) {
            (Some(model), _) => Some(model.as_str()),
            (None, LlmBackend::OpenAi) => Some(DEFAULT_OPENAI_MODEL),
            (None, LlmBackend::Claude) => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// `api_key_env`で指定された環境変数からAPIキーを読む
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.backend, LlmBackend::Claude);
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_llm_config_deserialize() {
        let toml_str = r#"
            backend = "openai"
            model = "gpt-4.1-mini"
            timeout_seconds = 30
        "#;
        let config: LlmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend, LlmBackend::OpenAi);
        assert_eq!(config.resolved_model(), Some("gpt-4.1-mini"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_llm_config_deserialize_empty() {
        let config: LlmConfig = toml::from_str("").unwrap();
        assert_eq!(config, LlmConfig::default());
    }

    #[test]
    fn test_resolved_model_defaults() {
        let mut config = LlmConfig::default();
        assert_eq!(config.resolved_model(), None);

        config.backend = LlmBackend::OpenAi;
        assert_eq!(config.resolved_model(), Some(DEFAULT_OPENAI_MODEL));
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("OpenAI".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert_eq!("claude".parse::<LlmBackend>().unwrap(), LlmBackend::Claude);
        assert!("gemini".parse::<LlmBackend>().is_err());
        assert_eq!(LlmBackend::OpenAi.to_string(), "openai");
    }

    #[test]
    fn test_api_key_from_custom_env() {
        let config = LlmConfig {
            api_key_env: "CATEGORY_AGENT_TEST_KEY_UNSET".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
