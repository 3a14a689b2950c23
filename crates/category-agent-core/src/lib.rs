pub mod agent;
pub mod category;
pub mod config;
pub mod error;
pub mod llm;
pub mod traversal;

pub use config::Config;
pub use error::{CategoryAgentError, Result};

// Taxonomy
pub use category::{
    join_path, split_path, CategoryNode, CategorySource, CategoryTree, PATH_DELIMITER,
    ROOT_SENTINEL, SAMPLE_CATEGORIES,
};

// Traversal protocol
pub use traversal::{
    AsyncDecisionMaker, ClassificationResult, Confidence, Decision, DecisionMaker,
    DecisionRequest, StepRecord, StopReason, Traversal, TraversalOptions, TraversalState,
};

// LLM backends
pub use agent::{
    CategoryAssignmentAgent, ClaudeCliDecisionMaker, LlmDecisionMaker, OpenAiDecisionMaker,
};
pub use llm::{check_claude_cli, execute_claude, require_claude_cli, LlmBackend, LlmConfig};
