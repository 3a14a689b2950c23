//! Prompt Construction
//!
//! 1レベル分の問い合わせをプロンプトに変換し、LLMの出力を`Decision`に戻す。

use serde::Deserialize;

use crate::error::{CategoryAgentError, Result};
use crate::traversal::{Confidence, Decision, DecisionRequest};

/// システムプロンプト
pub const SYSTEM_PROMPT: &str = r#"You are a category assignment agent that helps assign products to the correct category hierarchy.
You work one level at a time. At each level you are shown the category path chosen so far and the
categories available directly below it. Analyze the product description and choose the most
appropriate category from the list, or stop if you are not confident.

Guidelines:
- Only choose a name exactly as it appears in the list of available categories
- Be precise and specific in your category assignment
- If you're not confident about a category, stop instead of guessing
- Explain why the chosen category fits and why the other categories were not chosen

Respond with a single JSON object and nothing else:
{"category": "<one of the available categories, or null to stop>", "confidence": "high|medium|low", "reasoning": "<why>"}"#;

/// レベルごとのユーザープロンプトを組み立てる
pub fn build_level_prompt(request: &DecisionRequest<'_>) -> String {
    let current = if request.path.is_empty() {
        "(root - no category chosen yet)".to_string()
    } else {
        request.current_path()
    };

    let candidates = request
        .candidates
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Product Description is: "{description}"

## Level

{level}

## Current Category Path

{current}

## Available Categories

{candidates}

Choose the most appropriate category from the list above, or respond with "category": null if you
are not confident that any of them fits.
"#,
        description = request.description,
        level = request.level,
    )
}

/// Claude CLIのように1本の入力しか取れないバックエンド向けの結合プロンプト
pub fn build_combined_prompt(request: &DecisionRequest<'_>) -> String {
    format!("{}\n\n{}", SYSTEM_PROMPT, build_level_prompt(request))
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    confidence: Option<String>,
    #[serde(default)]
    reasoning: String,
}

/// LLM出力を`Decision`にパース
///
/// JSONとして読めない出力や未知の確信度ラベルは`MalformedResponse`。
/// `category`が`null`・空・`"none"`の場合は辞退。
pub fn parse_decision(output: &str) -> Result<Decision> {
    let json_str = extract_json_from_output(output);

    let raw: RawDecision =
        serde_json::from_str(json_str).map_err(|e| CategoryAgentError::MalformedResponse {
            message: format!("{} (output: {})", e, truncate(output, 200)),
        })?;

    let confidence = match raw.confidence.as_deref() {
        Some(label) => label.parse::<Confidence>()?,
        None => Confidence::Low,
    };

    let category = raw
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("none") && !c.eq_ignore_ascii_case("null"));

    Ok(Decision {
        category,
        confidence,
        reasoning: raw.reasoning,
    })
}

/// LLM出力からJSON部分を抽出
fn extract_json_from_output(output: &str) -> &str {
    if let Some(start) = output.find("```json") {
        let start = start + 7;
        if let Some(end) = output[start..].find("```") {
            return output[start..start + end].trim();
        }
    }
    if let Some(start) = output.find("```") {
        let start = start + 3;
        if let Some(end) = output[start..].find("```") {
            return output[start..start + end].trim();
        }
    }
    if let Some(start) = output.find('{') {
        if let Some(end) = output.rfind('}') {
            if end > start {
                return &output[start..=end];
            }
        }
    }
    output.trim()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let head: String = s.chars().take(max_chars).collect();
    format!("{}...", head)
}
