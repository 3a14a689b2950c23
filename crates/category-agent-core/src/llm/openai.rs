//! OpenAI Compatible Backend
//!
//! `/v1/chat/completions`互換エンドポイントへの1往復の呼び出し。
//! システムプロンプトとユーザーメッセージ1件を送り、最初のchoiceの本文を返す。
//! 通信用の型はこのモジュール内に閉じる。

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::error::{CategoryAgentError, Result};

/// OpenAI互換APIクライアント
///
/// 非同期用の`reqwest::Client`を保持する。
/// `complete`用のブロッキングクライアントは呼び出しごとに生成する（ランタイム内に置かない）。
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    api_key: Option<String>,
}

impl OpenAiClient {
    /// `api_key`が`None`ならAuthorizationヘッダを付けない（ローカルサーバー用）
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CategoryAgentError::LlmRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url,
            model,
            temperature,
            timeout,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn payload(&self, system: &str, content: &str) -> ChatCompletionRequest {
        // gpt-5系はtemperature指定を受け付けない
        let temperature = if self.model.starts_with("gpt-5") {
            None
        } else {
            Some(self.temperature)
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: content.to_string(),
                },
            ],
            temperature,
        }
    }

    /// 同期で1往復する
    pub fn complete(&self, system: &str, content: &str) -> Result<String> {
        let payload = self.payload(system, content);
        log_request(&payload, content);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| CategoryAgentError::LlmRequest(format!("failed to build HTTP client: {e}")))?;

        let mut req = client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
            CategoryAgentError::LlmRequest(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(status_error(status, &body));
        }

        let parsed = response.json::<ChatCompletionResponse>().map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            CategoryAgentError::LlmRequest(format!("failed to parse response body: {e}"))
        })?;

        first_choice_text(parsed)
    }

    /// `complete`の非同期版
    pub async fn complete_async(&self, system: &str, content: &str) -> Result<String> {
        let payload = self.payload(system, content);
        log_request(&payload, content);

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
            CategoryAgentError::LlmRequest(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(status_error(status, &body));
        }

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            CategoryAgentError::LlmRequest(format!("failed to parse response body: {e}"))
        })?;

        first_choice_text(parsed)
    }
}

fn log_request(payload: &ChatCompletionRequest, content: &str) {
    debug!(
        model = %payload.model,
        temperature = ?payload.temperature,
        content_len = content.len(),
        "sending LLM request"
    );
    if tracing::enabled!(tracing::Level::TRACE) {
        let json = serde_json::to_string_pretty(payload)
            .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
        trace!(payload = %json, "full LLM request payload");
    }
}

fn first_choice_text(parsed: ChatCompletionResponse) -> Result<String> {
    debug!(choices = parsed.choices.len(), "received LLM response");
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CategoryAgentError::LlmRequest("empty or missing content in response".into()))
}

fn status_error(status: reqwest::StatusCode, body: &str) -> CategoryAgentError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.to_string());
    error!(%status, %message, "LLM API returned error status");
    CategoryAgentError::LlmRequest(format!("HTTP {status}: {message}"))
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// OpenAI互換APIのエラーレスポンス
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
