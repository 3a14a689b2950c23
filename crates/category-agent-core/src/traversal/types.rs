//! Traversal Types
//!
//! 意思決定者とのやり取りと分類結果のデータ型。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::{join_path, ROOT_SENTINEL};
use crate::error::CategoryAgentError;

/// 確信度ラベル（`Low` < `Medium` < `High`）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = CategoryAgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(CategoryAgentError::MalformedResponse {
                message: format!("unknown confidence label '{}'", other),
            }),
        }
    }
}

/// 1レベル分の問い合わせ
#[derive(Debug, Clone, Copy)]
pub struct DecisionRequest<'a> {
    /// これから選ぶレベル（1始まり）
    pub level: usize,
    /// ここまでに確定したパス（ルートなら空）
    pub path: &'a [String],
    /// 候補となる子カテゴリ名（挿入順）
    pub candidates: &'a [String],
    /// 分類対象の説明文
    pub description: &'a str,
}

impl DecisionRequest<'_> {
    /// 現在位置を問い合わせ用のパス文字列で返す（ルートなら`"root"`）
    pub fn current_path(&self) -> String {
        if self.path.is_empty() {
            ROOT_SENTINEL.to_string()
        } else {
            join_path(self.path)
        }
    }
}

/// 意思決定者の回答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// 選んだ子カテゴリ名。`None`はこれ以上降りないことを意味する
    pub category: Option<String>,
    pub confidence: Confidence,
    pub reasoning: String,
}

impl Decision {
    pub fn select(
        category: impl Into<String>,
        confidence: Confidence,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category.into()),
            confidence,
            reasoning: reasoning.into(),
        }
    }

    pub fn decline(reasoning: impl Into<String>) -> Self {
        Self {
            category: None,
            confidence: Confidence::Low,
            reasoning: reasoning.into(),
        }
    }
}

/// 推論トレースの1レベル分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub level: usize,
    pub category: String,
    pub reasoning: String,
    pub confidence: Confidence,
}

/// トラバーサルが止まった理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// リーフに到達
    LeafReached,
    /// 意思決定者が辞退
    Declined { reasoning: String },
    /// 候補に無い名前が選ばれた
    UnknownCategory { name: String },
    /// 意思決定者の呼び出し・応答が失敗
    DecisionFailed { message: String },
    /// ステップ上限に到達
    StepLimit { max_steps: usize },
    /// タクソノミーが空
    EmptyTaxonomy,
}

impl StopReason {
    /// 人が読むための説明
    pub fn describe(&self) -> String {
        match self {
            Self::LeafReached => "Reached a leaf category".to_string(),
            Self::Declined { reasoning } => {
                format!("Stopped: not confident about the next level ({})", reasoning)
            }
            Self::UnknownCategory { name } => {
                format!("Stopped: '{}' is not one of the offered categories", name)
            }
            Self::DecisionFailed { message } => {
                format!("Stopped: no usable decision could be obtained ({})", message)
            }
            Self::StepLimit { max_steps } => {
                format!("Stopped: step limit of {} reached", max_steps)
            }
            Self::EmptyTaxonomy => "Stopped: the taxonomy has no categories".to_string(),
        }
    }
}

/// 分類結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub product_description: String,
    /// 確定したパス（`" > "`区切り、空なら割り当てなし）
    pub category_path: String,
    /// 各レベルの推論を連結した説明
    pub reasoning: String,
    /// 全体の確信度（各レベルの最小値）
    pub confidence: Confidence,
    /// リーフまで到達したか
    pub is_complete: bool,
    pub steps: Vec<StepRecord>,
    pub stop_reason: StopReason,
}

impl ClassificationResult {
    /// 確定したセグメント
    pub fn segments(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.category.as_str()).collect()
    }

    /// 何も割り当てられなかったか
    pub fn is_unassigned(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
        assert_eq!(
            [Confidence::High, Confidence::Low, Confidence::Medium]
                .into_iter()
                .min(),
            Some(Confidence::Low)
        );
    }

    #[test]
    fn test_confidence_parse() {
        assert_eq!("HIGH".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!(" medium ".parse::<Confidence>().unwrap(), Confidence::Medium);
        assert!("certain".parse::<Confidence>().is_err());
    }

    #[test]
    fn test_confidence_serde() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let parsed: Confidence = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(parsed, Confidence::High);
    }

    #[test]
    fn test_request_current_path() {
        let candidates = vec!["Beverages".to_string()];
        let root = DecisionRequest {
            level: 1,
            path: &[],
            candidates: &candidates,
            description: "cola",
        };
        assert_eq!(root.current_path(), "root");

        let path = vec!["Beverages".to_string(), "Soft Drinks".to_string()];
        let nested = DecisionRequest {
            level: 3,
            path: &path,
            ..root
        };
        assert_eq!(nested.current_path(), "Beverages > Soft Drinks");
    }

    #[test]
    fn test_decline_is_low() {
        let decision = Decision::decline("ambiguous");
        assert!(decision.category.is_none());
        assert_eq!(decision.confidence, Confidence::Low);
    }

    #[test]
    fn test_stop_reason_serialization() {
        let json = serde_json::to_value(StopReason::UnknownCategory {
            name: "Tea".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "unknown_category");
        assert_eq!(json["name"], "Tea");
    }
}
