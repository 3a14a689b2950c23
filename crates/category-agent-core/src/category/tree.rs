//! Category Tree
//!
//! ルートノードを所有し、パス単位での挿入・検索・列挙を提供する。
//! 構築（一括ロード）後は読み取り専用で使う前提。

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{CategoryAgentError, Result};

use super::node::CategoryNode;
use super::{split_path, ROOT_SENTINEL};

/// 「パスPの子一覧」だけを返す問い合わせインターフェース
///
/// 意思決定者がトラバーサル中に使えるのはこの操作のみ。
/// `category_path`はルートセンチネル`"root"`か確定済みのパス。
pub trait CategorySource {
    fn list_children(&self, category_path: &str) -> Vec<String>;
}

/// カテゴリタクソノミー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTree {
    root: CategoryNode,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self {
            root: CategoryNode::new(ROOT_SENTINEL),
        }
    }

    /// パス文字列の一覧から構築
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.add_category_path(path.as_ref());
        }
        tree
    }

    /// タクソノミーファイルを読み込む
    ///
    /// 1行1パス。空行と`#`で始まる行は無視する。
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CategoryAgentError::TaxonomyNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let tree = Self::from_paths(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        );

        if tree.root.is_leaf() {
            return Err(CategoryAgentError::EmptyTaxonomy {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), leaves = tree.get_all_categories().len(), "loaded taxonomy");
        Ok(tree)
    }

    pub fn root(&self) -> &CategoryNode {
        &self.root
    }

    /// カテゴリパスを追加（途中ノードも作成、冪等）
    pub fn add_category_path(&mut self, category_path: &str) {
        if category_path.trim().is_empty() {
            return;
        }

        let mut current = &mut self.root;
        for segment in split_path(category_path) {
            current = current.add_child(segment);
        }
    }

    /// パスでノードを取得
    ///
    /// `"root"`はルートノードそのもの。途中のセグメントが見つからなければ`None`。
    pub fn get_category_node(&self, category_path: &str) -> Option<&CategoryNode> {
        if category_path == ROOT_SENTINEL {
            return Some(&self.root);
        }

        let mut current = &self.root;
        for segment in split_path(category_path) {
            current = current.get_child(segment)?;
        }
        Some(current)
    }

    /// パスの子ノード名一覧
    ///
    /// 存在しないパスも空リストになる（リーフとは区別できない）。
    pub fn get_children(&self, category_path: &str) -> Vec<String> {
        self.get_category_node(category_path)
            .map(CategoryNode::get_children)
            .unwrap_or_default()
    }

    /// 全リーフパス（ルートセンチネルは含まない）
    pub fn get_all_categories(&self) -> Vec<String> {
        self.root
            .children()
            .iter()
            .flat_map(|child| child.get_all_paths(""))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// 最深ブランチの段数（ルートは数えない）
    pub fn depth(&self) -> usize {
        self.root.depth() - 1
    }

    /// ツリー構造をテキストで描画
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(self.root.name());
        out.push('\n');

        let children = self.root.children();
        for (i, child) in children.iter().enumerate() {
            render_node(child, "", i == children.len() - 1, &mut out);
        }
        out
    }
}

impl Default for CategoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CategorySource for CategoryTree {
    fn list_children(&self, category_path: &str) -> Vec<String> {
        self.get_children(category_path)
    }
}

fn render_node(node: &CategoryNode, prefix: &str, is_last: bool, out: &mut String) {
    let connector = if is_last { "└── " } else { "├── " };
    out.push_str(prefix);
    out.push_str(connector);
    out.push_str(node.name());
    out.push('\n');

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        render_node(child, &child_prefix, i == children.len() - 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO: &[&str] = &[
        "Beverages > Fruit & Vegetable Juices > Wellness Shots",
        "Beverages > Fruit & Vegetable Juices > Other Juices",
        "Pantry > Packaged Fruit & Applesauce",
    ];

    #[test]
    fn test_scenario_children_and_categories() {
        let tree = CategoryTree::from_paths(SCENARIO);

        assert_eq!(tree.get_children("root"), vec!["Beverages", "Pantry"]);
        assert_eq!(
            tree.get_children("Beverages"),
            vec!["Fruit & Vegetable Juices"]
        );
        assert_eq!(tree.get_all_categories().len(), 3);
    }

    #[test]
    fn test_inserted_paths_resolve_and_prefix_categories() {
        let paths = [
            "Beverages > Drink Mixes > Protein Powder",
            "Beverages > Drink Mixes",
            "Household Supplies > Household Cleaning Supplies > Household Cleaning Products > Dish Soap",
        ];
        let tree = CategoryTree::from_paths(paths);
        let all = tree.get_all_categories();

        for path in paths {
            assert!(tree.get_category_node(path).is_some(), "{} missing", path);
            assert!(
                all.iter().any(|c| c.starts_with(path)),
                "{} is not a prefix of {:?}",
                path,
                all
            );
        }
    }

    #[test]
    fn test_double_insert_is_idempotent() {
        let mut tree = CategoryTree::from_paths(SCENARIO);
        let before = tree.get_all_categories();

        tree.add_category_path(SCENARIO[0]);
        tree.add_category_path("Beverages > Fruit & Vegetable Juices");

        assert_eq!(tree.get_all_categories(), before);
    }

    #[test]
    fn test_leaf_iff_no_children() {
        let tree = CategoryTree::from_paths(SCENARIO);
        let all = tree.get_all_categories();

        for path in &all {
            let node = tree.get_category_node(path).unwrap();
            assert!(node.is_leaf());
            assert!(tree.get_children(path).is_empty());
            assert_eq!(all.iter().filter(|c| *c == path).count(), 1);
        }

        let inner = tree.get_category_node("Beverages").unwrap();
        assert!(!inner.is_leaf());
        assert!(!tree.get_children("Beverages").is_empty());
    }

    #[test]
    fn test_root_sentinel_matches_root_children() {
        let tree = CategoryTree::from_paths(crate::category::SAMPLE_CATEGORIES);
        assert_eq!(tree.get_children("root"), tree.root().get_children());
        assert_eq!(
            tree.get_category_node("root").map(CategoryNode::name),
            Some("root")
        );
    }

    #[test]
    fn test_missing_path_short_circuits() {
        let tree = CategoryTree::from_paths(SCENARIO);
        assert!(tree.get_category_node("Beverages > Tea").is_none());
        assert!(tree.get_category_node("Tea > Fruit & Vegetable Juices").is_none());
        assert!(tree.get_children("Beverages > Tea > Green").is_empty());
    }

    #[test]
    fn test_blank_path_is_ignored() {
        let mut tree = CategoryTree::new();
        tree.add_category_path("   ");
        assert!(tree.is_empty());
        assert!(tree.get_all_categories().is_empty());
    }

    #[test]
    fn test_list_children_through_source_trait() {
        let tree = CategoryTree::from_paths(SCENARIO);
        let source: &dyn CategorySource = &tree;
        assert_eq!(source.list_children("root"), vec!["Beverages", "Pantry"]);
        assert!(source.list_children("Unknown").is_empty());
    }

    #[test]
    fn test_depth() {
        let tree = CategoryTree::from_paths(SCENARIO);
        assert_eq!(tree.depth(), 3);
        assert_eq!(CategoryTree::new().depth(), 0);
    }

    #[test]
    fn test_render() {
        let tree = CategoryTree::from_paths(SCENARIO);
        let expected = "root\n\
                        ├── Beverages\n\
                        │   └── Fruit & Vegetable Juices\n\
                        │       ├── Wellness Shots\n\
                        │       └── Other Juices\n\
                        └── Pantry\n\
                        \x20   └── Packaged Fruit & Applesauce\n";
        assert_eq!(tree.render(), expected);
    }

    #[test]
    fn test_load_file_skips_comments_and_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# grocery taxonomy").unwrap();
        writeln!(file, "Beverages > Drink Mixes > Protein Powder").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  Pantry > Packaged Seafood > Other Packaged Seafood  ").unwrap();

        let tree = CategoryTree::load_file(file.path()).unwrap();
        assert_eq!(
            tree.get_all_categories(),
            vec![
                "Beverages > Drink Mixes > Protein Powder",
                "Pantry > Packaged Seafood > Other Packaged Seafood",
            ]
        );
    }

    #[test]
    fn test_load_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("categories.txt");
        assert!(matches!(
            CategoryTree::load_file(&missing),
            Err(CategoryAgentError::TaxonomyNotFound { .. })
        ));

        fs::write(&missing, "# nothing here\n\n").unwrap();
        assert!(matches!(
            CategoryTree::load_file(&missing),
            Err(CategoryAgentError::EmptyTaxonomy { .. })
        ));
    }
}
