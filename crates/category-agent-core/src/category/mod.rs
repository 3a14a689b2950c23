//! # Category Module
//!
//! 多段のカテゴリタクソノミーをツリーとして保持する。
//!
//! ## パス表現
//!
//! カテゴリパスはセグメントを`" > "`で連結した文字列で表す。
//! セグメント名に区切り文字を含めるエスケープ手段は無い。
//! ルートノードはどのパスにも現れず、問い合わせ時はセンチネル`"root"`で指す。
//!
//! ## モジュール構成
//!
//! - `node`: ツリーのノード
//! - `tree`: ツリー本体と問い合わせインターフェース
//! - `builtin`: サンプルタクソノミー
//!
//! ## 使用例
//!
//! ```rust
//! use category_agent_core::category::CategoryTree;
//!
//! let tree = CategoryTree::from_paths([
//!     "Beverages > Fruit & Vegetable Juices > Wellness Shots",
//!     "Pantry > Packaged Fruit & Applesauce",
//! ]);
//!
//! assert_eq!(tree.get_children("root"), vec!["Beverages", "Pantry"]);
//! assert_eq!(tree.get_all_categories().len(), 2);
//! ```

mod builtin;
mod node;
mod tree;

// Re-exports
pub use builtin::SAMPLE_CATEGORIES;
pub use node::CategoryNode;
pub use tree::{CategorySource, CategoryTree};

/// パスセグメントの区切り文字
pub const PATH_DELIMITER: &str = " > ";

/// ルートノードを指すトークン
pub const ROOT_SENTINEL: &str = "root";

/// パス文字列をセグメントに分割
pub fn split_path(category_path: &str) -> impl Iterator<Item = &str> {
    category_path.split(PATH_DELIMITER)
}

/// セグメントをパス文字列に連結
///
/// 空の場合はルートセンチネルではなく空文字列を返す。
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PATH_DELIMITER)
}
