//! Category Node
//!
//! タクソノミーの1ノード。子ノードは親が排他的に所有し、挿入順を保持する。

use super::PATH_DELIMITER;

/// カテゴリノード
///
/// `name`は兄弟間でのみ一意。子は挿入順の`Vec`で保持し、
/// 列挙結果が常に決定的になるようにしている。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    name: String,
    children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// 子を持たないノードを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// このレベルのセグメント名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 子ノードを追加
    ///
    /// 同名の子が既にあればそれを返す（冪等）。
    pub fn add_child(&mut self, child_name: &str) -> &mut CategoryNode {
        let index = match self.position(child_name) {
            Some(index) => index,
            None => {
                self.children.push(CategoryNode::new(child_name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// 子ノードを名前で取得
    pub fn get_child(&self, child_name: &str) -> Option<&CategoryNode> {
        self.children.iter().find(|c| c.name == child_name)
    }

    pub fn has_child(&self, child_name: &str) -> bool {
        self.position(child_name).is_some()
    }

    /// 子ノード名一覧（挿入順のスナップショット）
    pub fn get_children(&self) -> Vec<String> {
        self.children.iter().map(|c| c.name.clone()).collect()
    }

    /// 子ノードへの参照（挿入順）
    pub fn children(&self) -> &[CategoryNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// このノード以下の全リーフパスを列挙
    ///
    /// 深さ優先・挿入順。`prefix`が空ならこのノード名から始まる。
    /// 子を持たないノードは自分自身のパスを1つだけ返す。
    pub fn get_all_paths(&self, prefix: &str) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(prefix, &mut paths);
        paths
    }

    /// このノードから最深リーフまでの段数（自身を含む）
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        let path = if prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}{}{}", prefix, PATH_DELIMITER, self.name)
        };

        if self.children.is_empty() {
            out.push(path);
            return;
        }

        for child in &self.children {
            child.collect_paths(&path, out);
        }
    }

    fn position(&self, child_name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == child_name)
    }
}
