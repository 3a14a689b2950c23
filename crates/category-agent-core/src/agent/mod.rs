//! # Agent Module
//!
//! タクソノミーと意思決定者を束ね、説明文をカテゴリパスに割り当てる。
//!
//! ## モジュール構成
//!
//! - `prompt`: プロンプト生成とLLM出力のパース
//! - `llm_decision`: LLMバックエンドによる意思決定者
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use category_agent_core::agent::{CategoryAssignmentAgent, LlmDecisionMaker};
//! use category_agent_core::category::{CategoryTree, SAMPLE_CATEGORIES};
//! use category_agent_core::llm::LlmConfig;
//!
//! let tree = CategoryTree::from_paths(SAMPLE_CATEGORIES);
//! let maker = LlmDecisionMaker::from_config(&LlmConfig::default(), ".".into())?;
//! let agent = CategoryAssignmentAgent::new(tree, maker);
//!
//! let result = agent.assign_category("Coca-Cola Cola Original Taste Soda Pop - 6 pack");
//! println!("{}", result.category_path);
//! ```

mod llm_decision;
mod prompt;

use tracing::{info_span, Instrument};

use crate::category::CategoryTree;
use crate::traversal::{
    AsyncDecisionMaker, ClassificationResult, DecisionMaker, Traversal, TraversalOptions,
};

// Re-exports
pub use llm_decision::{ClaudeCliDecisionMaker, LlmDecisionMaker, OpenAiDecisionMaker};
pub use prompt::{build_combined_prompt, build_level_prompt, parse_decision, SYSTEM_PROMPT};

/// カテゴリ割り当てエージェント
///
/// ツリーは構築後に読み取り専用となり、各割り当ては独立したトラバーサルで行う。
pub struct CategoryAssignmentAgent<D> {
    tree: CategoryTree,
    decision_maker: D,
    options: TraversalOptions,
}

impl<D> CategoryAssignmentAgent<D> {
    pub fn new(tree: CategoryTree, decision_maker: D) -> Self {
        Self {
            tree,
            decision_maker,
            options: TraversalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TraversalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn decision_maker(&self) -> &D {
        &self.decision_maker
    }

    pub fn options(&self) -> TraversalOptions {
        self.options
    }
}

impl<D: DecisionMaker> CategoryAssignmentAgent<D> {
    /// 説明文をカテゴリパスに割り当てる
    ///
    /// 失敗しない。意思決定者が使えなくても空パスの結果を返す。
    pub fn assign_category(&self, product_description: &str) -> ClassificationResult {
        let _span = info_span!("assign_category", description = product_description).entered();
        Traversal::new(&self.tree, product_description, self.options).run(&self.decision_maker)
    }
}

impl<D: AsyncDecisionMaker> CategoryAssignmentAgent<D> {
    /// `assign_category`の非同期版
    pub async fn assign_category_async(&self, product_description: &str) -> ClassificationResult {
        let span = info_span!("assign_category_async", description = product_description);
        Traversal::new(&self.tree, product_description, self.options)
            .run_async(&self.decision_maker)
            .instrument(span)
            .await
    }
}
