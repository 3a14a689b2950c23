//! LLM Decision Makers
//!
//! `DecisionMaker` / `AsyncDecisionMaker`をLLMバックエンドで実装する。
//! 通信エラーも不正な出力も`Err`として返し、辞退への変換はトラバーサルに任せる。

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CategoryAgentError, Result};
use crate::llm::{
    require_claude_cli, run_claude, run_claude_async, LlmBackend, LlmConfig, OpenAiClient,
};
use crate::traversal::{AsyncDecisionMaker, Decision, DecisionMaker, DecisionRequest};

use super::prompt::{build_combined_prompt, build_level_prompt, parse_decision, SYSTEM_PROMPT};

/// Claude CLIによる意思決定者
///
/// 1回の問い合わせは`timeout`で打ち切られ、`Err`として返る。
#[derive(Debug, Clone)]
pub struct ClaudeCliDecisionMaker {
    program: PathBuf,
    working_dir: PathBuf,
    model: Option<String>,
    timeout: Duration,
}

impl ClaudeCliDecisionMaker {
    pub fn new(working_dir: PathBuf, model: Option<String>, timeout: Duration) -> Self {
        Self {
            program: PathBuf::from("claude"),
            working_dir,
            model,
            timeout,
        }
    }

    /// `claude`以外の実行ファイルを使う（ラッパースクリプト等）
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl DecisionMaker for ClaudeCliDecisionMaker {
    fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        let prompt = build_combined_prompt(request);
        let output = run_claude(
            &self.program,
            &self.working_dir,
            &prompt,
            self.model.as_deref(),
            self.timeout,
        )?;
        parse_decision(&output)
    }
}

impl AsyncDecisionMaker for ClaudeCliDecisionMaker {
    async fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        let prompt = build_combined_prompt(request);
        let output = run_claude_async(
            &self.program,
            &self.working_dir,
            &prompt,
            self.model.as_deref(),
            self.timeout,
        )
        .await?;
        parse_decision(&output)
    }
}

/// OpenAI互換APIによる意思決定者
#[derive(Debug, Clone)]
pub struct OpenAiDecisionMaker {
    client: OpenAiClient,
}

impl OpenAiDecisionMaker {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

impl DecisionMaker for OpenAiDecisionMaker {
    fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        let output = self
            .client
            .complete(SYSTEM_PROMPT, &build_level_prompt(request))?;
        parse_decision(&output)
    }
}

impl AsyncDecisionMaker for OpenAiDecisionMaker {
    async fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        let output = self
            .client
            .complete_async(SYSTEM_PROMPT, &build_level_prompt(request))
            .await?;
        parse_decision(&output)
    }
}

/// 設定から選ばれるLLM意思決定者
#[derive(Debug, Clone)]
pub enum LlmDecisionMaker {
    Claude(ClaudeCliDecisionMaker),
    OpenAi(OpenAiDecisionMaker),
}

impl LlmDecisionMaker {
    /// `LlmConfig`からバックエンドを構築
    ///
    /// # Errors
    /// * `ClaudeNotFound` - Claude CLIが見つからない場合
    /// * `MissingApiKey` - OpenAIバックエンドでAPIキーが未設定の場合
    pub fn from_config(config: &LlmConfig, working_dir: PathBuf) -> Result<Self> {
        match config.backend {
            LlmBackend::Claude => {
                require_claude_cli()?;
                Ok(Self::Claude(ClaudeCliDecisionMaker::new(
                    working_dir,
                    config.resolved_model().map(str::to_string),
                    config.timeout(),
                )))
            }
            LlmBackend::OpenAi => {
                let api_key =
                    config
                        .api_key()
                        .ok_or_else(|| CategoryAgentError::MissingApiKey {
                            var: config.api_key_env.clone(),
                        })?;
                let client = OpenAiClient::new(
                    config.api_base_url.clone(),
                    config
                        .resolved_model()
                        .unwrap_or(crate::llm::DEFAULT_OPENAI_MODEL)
                        .to_string(),
                    config.temperature,
                    config.timeout(),
                    Some(api_key),
                )?;
                Ok(Self::OpenAi(OpenAiDecisionMaker::new(client)))
            }
        }
    }

    pub fn backend(&self) -> LlmBackend {
        match self {
            Self::Claude(_) => LlmBackend::Claude,
            Self::OpenAi(_) => LlmBackend::OpenAi,
        }
    }
}

impl DecisionMaker for LlmDecisionMaker {
    fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        match self {
            Self::Claude(maker) => DecisionMaker::decide(maker, request),
            Self::OpenAi(maker) => DecisionMaker::decide(maker, request),
        }
    }
}

impl AsyncDecisionMaker for LlmDecisionMaker {
    async fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        match self {
            Self::Claude(maker) => AsyncDecisionMaker::decide(maker, request).await,
            Self::OpenAi(maker) => AsyncDecisionMaker::decide(maker, request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryTree;
    use crate::traversal::{StopReason, Traversal, TraversalOptions};

    #[test]
    fn test_openai_backend_requires_api_key() {
        let config = LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key_env: "CATEGORY_AGENT_TEST_MISSING_KEY".to_string(),
            ..LlmConfig::default()
        };

        let err = LlmDecisionMaker::from_config(&config, PathBuf::from(".")).unwrap_err();
        assert!(matches!(
            err,
            CategoryAgentError::MissingApiKey { ref var } if var == "CATEGORY_AGENT_TEST_MISSING_KEY"
        ));
    }

    #[test]
    fn test_unreachable_endpoint_terminates_cleanly() {
        // 接続できないエンドポイントでもトラバーサルは空パスで終わる
        let client = OpenAiClient::new(
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            "gpt-4.1".to_string(),
            0.0,
            Duration::from_secs(2),
            Some("test-key".to_string()),
        )
        .unwrap();
        let maker = LlmDecisionMaker::OpenAi(OpenAiDecisionMaker::new(client));
        assert_eq!(maker.backend(), LlmBackend::OpenAi);

        let tree = CategoryTree::from_paths(["Beverages > Soft Drinks > Cola"]);
        let result = Traversal::new(&tree, "cola", TraversalOptions::default()).run(&maker);

        assert!(result.is_unassigned());
        assert!(!result.is_complete);
        assert!(matches!(
            result.stop_reason,
            StopReason::DecisionFailed { .. }
        ));
    }

    /// 実行可能なシェルスクリプトを`claude`の代わりに置く
    #[cfg(unix)]
    fn fake_claude(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("claude");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_claude_decide_gives_up_after_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_claude(dir.path(), "exec sleep 30");
        let maker =
            ClaudeCliDecisionMaker::new(dir.path().to_path_buf(), None, Duration::from_secs(1))
                .with_program(script);

        let candidates = vec!["Beverages".to_string(), "Pantry".to_string()];
        let request = DecisionRequest {
            level: 1,
            path: &[],
            candidates: &candidates,
            description: "Coca-Cola Original Taste - 6 pack",
        };

        let started = std::time::Instant::now();
        let err = DecisionMaker::decide(&maker, &request).unwrap_err();

        assert!(
            started.elapsed() < Duration::from_secs(10),
            "decide blocked for {:?}",
            started.elapsed()
        );
        assert!(matches!(
            err,
            CategoryAgentError::ClaudeExecutionFailed { ref message } if message.contains("Timed out")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_claude_timeout_ends_traversal_as_decline() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_claude(dir.path(), "exec sleep 30");
        let maker = LlmDecisionMaker::Claude(
            ClaudeCliDecisionMaker::new(dir.path().to_path_buf(), None, Duration::from_secs(1))
                .with_program(script),
        );

        let tree = CategoryTree::from_paths(["Beverages > Soft Drinks > Cola"]);
        let result = Traversal::new(&tree, "cola", TraversalOptions::default()).run(&maker);

        assert!(result.is_unassigned());
        assert!(matches!(
            result.stop_reason,
            StopReason::DecisionFailed { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_claude_decide_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_claude(
            dir.path(),
            r#"cat > /dev/null
echo '{"category": "Soft Drinks", "confidence": "high", "reasoning": "soda"}'"#,
        );
        let maker =
            ClaudeCliDecisionMaker::new(dir.path().to_path_buf(), None, Duration::from_secs(10))
                .with_program(script);

        let path = vec!["Beverages".to_string()];
        let candidates = vec!["Soft Drinks".to_string(), "Water".to_string()];
        let request = DecisionRequest {
            level: 2,
            path: &path,
            candidates: &candidates,
            description: "Coca-Cola Original Taste - 6 pack",
        };

        let decision = DecisionMaker::decide(&maker, &request).unwrap();
        assert_eq!(decision.category.as_deref(), Some("Soft Drinks"));
        assert_eq!(decision.confidence, crate::traversal::Confidence::High);
    }
}
