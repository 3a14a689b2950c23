//! Traversal Protocol
//!
//! レベルごとの降下を状態機械として実装する。
//! 同期版と非同期版は遷移ロジック（`prepare` / `apply`）を共有する。

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::category::{join_path, CategorySource, ROOT_SENTINEL};
use crate::error::Result;

use super::decision::{AsyncDecisionMaker, DecisionMaker};
use super::types::{
    ClassificationResult, Confidence, Decision, DecisionRequest, StepRecord, StopReason,
};

/// 1トラバーサルあたりの意思決定回数の既定上限
pub const DEFAULT_MAX_STEPS: usize = 32;

/// トラバーサル設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalOptions {
    /// 意思決定者への問い合わせ回数の上限
    pub max_steps: usize,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// トラバーサルの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalState {
    AtRoot,
    AtNode(Vec<String>),
    Terminated {
        path: Vec<String>,
        confidence: Confidence,
        reasoning: String,
    },
}

impl TraversalState {
    pub fn path(&self) -> &[String] {
        match self {
            Self::AtRoot => &[],
            Self::AtNode(path) | Self::Terminated { path, .. } => path,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated { .. })
    }
}

/// 1件の分類に対応するトラバーサル
///
/// ツリーは`CategorySource`経由で子一覧を問い合わせるだけで、変更しない。
pub struct Traversal<'a, S: CategorySource + ?Sized> {
    source: &'a S,
    description: &'a str,
    options: TraversalOptions,
    state: TraversalState,
    steps: Vec<StepRecord>,
    stop_reason: Option<StopReason>,
    decisions_requested: usize,
}

impl<'a, S: CategorySource + ?Sized> Traversal<'a, S> {
    pub fn new(source: &'a S, description: &'a str, options: TraversalOptions) -> Self {
        Self {
            source,
            description,
            options,
            state: TraversalState::AtRoot,
            steps: Vec::new(),
            stop_reason: None,
            decisions_requested: 0,
        }
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// 記録済みの推論トレース
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// 1レベル進める。まだ続行中なら`true`
    pub fn step<D: DecisionMaker + ?Sized>(&mut self, maker: &D) -> bool {
        let Some(candidates) = self.prepare() else {
            return false;
        };

        let outcome = {
            let request = self.request(&candidates);
            DecisionMaker::decide(maker, &request)
        };
        self.apply(&candidates, outcome);
        !self.state.is_terminated()
    }

    /// `step`の非同期版
    pub async fn step_async<D: AsyncDecisionMaker + ?Sized>(&mut self, maker: &D) -> bool {
        let Some(candidates) = self.prepare() else {
            return false;
        };

        let outcome = {
            let request = self.request(&candidates);
            AsyncDecisionMaker::decide(maker, &request).await
        };
        self.apply(&candidates, outcome);
        !self.state.is_terminated()
    }

    /// 終了まで降りて結果を返す
    pub fn run<D: DecisionMaker + ?Sized>(mut self, maker: &D) -> ClassificationResult {
        while self.step(maker) {}
        self.finish()
    }

    /// 終了まで降りて結果を返す（非同期）
    pub async fn run_async<D: AsyncDecisionMaker + ?Sized>(
        mut self,
        maker: &D,
    ) -> ClassificationResult {
        while self.step_async(maker).await {}
        self.finish()
    }

    /// 次に提示する候補を求める。終了した場合は`None`
    fn prepare(&mut self) -> Option<Vec<String>> {
        if self.state.is_terminated() {
            return None;
        }

        let query = self.query_path();
        let children = self.source.list_children(&query);
        debug!(path = %query, children = children.len(), "listed children");

        if children.is_empty() {
            let reason = if self.state.path().is_empty() {
                StopReason::EmptyTaxonomy
            } else {
                StopReason::LeafReached
            };
            self.terminate(reason);
            return None;
        }

        if self.decisions_requested >= self.options.max_steps {
            self.terminate(StopReason::StepLimit {
                max_steps: self.options.max_steps,
            });
            return None;
        }

        Some(children)
    }

    fn request<'r>(&'r self, candidates: &'r [String]) -> DecisionRequest<'r> {
        DecisionRequest {
            level: self.steps.len() + 1,
            path: self.state.path(),
            candidates,
            description: self.description,
        }
    }

    fn apply(&mut self, candidates: &[String], outcome: Result<Decision>) {
        self.decisions_requested += 1;
        let level = self.steps.len() + 1;

        let decision = match outcome {
            Ok(decision) => decision,
            Err(e) => {
                warn!(level, error = %e, "decision failed, treating as decline");
                self.terminate(StopReason::DecisionFailed {
                    message: e.to_string(),
                });
                return;
            }
        };

        let Some(selected) = decision.category else {
            debug!(level, "decision maker declined");
            self.terminate(StopReason::Declined {
                reasoning: decision.reasoning,
            });
            return;
        };

        // 完全一致を優先し、前後の空白を除いた名前はその次に照合する
        let Some(selected) = candidates
            .iter()
            .find(|c| **c == selected)
            .or_else(|| candidates.iter().find(|c| c.as_str() == selected.trim()))
        else {
            warn!(level, selected = %selected, "selected category is not among the candidates");
            self.terminate(StopReason::UnknownCategory { name: selected });
            return;
        };

        debug!(level, selected = %selected, confidence = %decision.confidence, "descending");
        let mut path = self.state.path().to_vec();
        path.push(selected.to_string());
        self.steps.push(StepRecord {
            level,
            category: selected.to_string(),
            reasoning: decision.reasoning,
            confidence: decision.confidence,
        });
        self.state = TraversalState::AtNode(path);
    }

    fn terminate(&mut self, reason: StopReason) {
        let path = self.state.path().to_vec();
        let confidence = self.overall_confidence();
        let reasoning = self.summarize(&reason);

        info!(
            path = %join_path(&path),
            confidence = %confidence,
            complete = matches!(reason, StopReason::LeafReached),
            "traversal terminated"
        );

        self.state = TraversalState::Terminated {
            path,
            confidence,
            reasoning,
        };
        self.stop_reason = Some(reason);
    }

    fn finish(mut self) -> ClassificationResult {
        if !self.state.is_terminated() {
            self.terminate(StopReason::StepLimit {
                max_steps: self.options.max_steps,
            });
        }

        let stop_reason = self.stop_reason.unwrap_or(StopReason::EmptyTaxonomy);
        let (path, confidence, reasoning) = match self.state {
            TraversalState::Terminated {
                path,
                confidence,
                reasoning,
            } => (path, confidence, reasoning),
            TraversalState::AtRoot | TraversalState::AtNode(_) => {
                (Vec::new(), Confidence::Low, stop_reason.describe())
            }
        };

        ClassificationResult {
            product_description: self.description.to_string(),
            category_path: join_path(&path),
            reasoning,
            confidence,
            is_complete: matches!(stop_reason, StopReason::LeafReached),
            steps: self.steps,
            stop_reason,
        }
    }

    fn query_path(&self) -> String {
        let path = self.state.path();
        if path.is_empty() {
            ROOT_SENTINEL.to_string()
        } else {
            join_path(path)
        }
    }

    /// 確定したレベルの最小確信度。何も確定していなければ`Low`
    fn overall_confidence(&self) -> Confidence {
        self.steps
            .iter()
            .map(|s| s.confidence)
            .min()
            .unwrap_or(Confidence::Low)
    }

    fn summarize(&self, reason: &StopReason) -> String {
        let mut lines: Vec<String> = self
            .steps
            .iter()
            .map(|s| {
                format!(
                    "Level {} - {} ({}): {}",
                    s.level, s.category, s.confidence, s.reasoning
                )
            })
            .collect();

        if self.steps.is_empty() && !matches!(reason, StopReason::LeafReached) {
            lines.push("No category could be confidently chosen.".to_string());
        }
        lines.push(reason.describe());
        lines.join("\n")
    }
}
