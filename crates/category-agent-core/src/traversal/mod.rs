//! # Traversal Module
//!
//! 意思決定者に1レベルずつ子カテゴリを提示し、ツリーを降りていくプロトコル。
//!
//! ## 状態遷移
//!
//! `AtRoot` → `AtNode(path)`（0回以上）→ `Terminated`
//!
//! 1. 現在ノードの子を問い合わせる
//! 2. 子が無ければリーフ到達として終了
//! 3. 子一覧と説明文を意思決定者に渡す
//! 4. 有効な子が選ばれたら1段降りる
//! 5. 辞退・候補外の名前・応答エラーはすべて辞退扱いで終了
//!
//! 意思決定者の失敗はツリー構造の失敗として伝播しない。
//! 最悪でも空パス・`low`の結果が返る。
//!
//! ## 使用例
//!
//! ```rust
//! use category_agent_core::category::CategoryTree;
//! use category_agent_core::traversal::{
//!     Confidence, Decision, DecisionMaker, DecisionRequest, Traversal, TraversalOptions,
//! };
//!
//! struct FirstChild;
//!
//! impl DecisionMaker for FirstChild {
//!     fn decide(&self, request: &DecisionRequest<'_>) -> category_agent_core::Result<Decision> {
//!         Ok(Decision::select(&request.candidates[0], Confidence::High, "first"))
//!     }
//! }
//!
//! let tree = CategoryTree::from_paths(["Beverages > Drink Mixes > Protein Powder"]);
//! let result = Traversal::new(&tree, "whey protein", TraversalOptions::default()).run(&FirstChild);
//!
//! assert!(result.is_complete);
//! assert_eq!(result.category_path, "Beverages > Drink Mixes > Protein Powder");
//! ```

mod decision;
mod protocol;
mod types;

// Re-exports
pub use decision::{AsyncDecisionMaker, DecisionMaker};
pub use protocol::{Traversal, TraversalOptions, TraversalState, DEFAULT_MAX_STEPS};
pub use types::{ClassificationResult, Confidence, Decision, DecisionRequest, StepRecord, StopReason};
