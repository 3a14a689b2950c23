//! Builtin Sample Taxonomy
//!
//! タクソノミーファイルが無い場合に使うサンプルカテゴリ。

/// サンプルのカテゴリパス一覧
///
/// 同名セグメント（`Cola`、`Zero Sugar Cola`）が別ブランチに現れる例を含む。
pub const SAMPLE_CATEGORIES: &[&str] = &[
    "Beverages > Fruit & Vegetable Juices > Wellness Shots",
    "Beverages > Fruit & Vegetable Juices > Other Juices",
    "Apparel & Accessories > Clothing > Underwear & Socks > Shapewear",
    "Pantry > Packaged Fruit & Applesauce > Other Packaged Fruit",
    "Sporting Goods > Athletics > Water Sports",
    "Beverages > Drink Mixes > Energy & Hydration Mixes",
    "Household Supplies > Household Cleaning Supplies > Household Cleaning Products > Dish Soap",
    "Beverages > Drink Mixes > Protein Powder",
    "Beverages > Carbonated Drinks > Cola > Zero Sugar Cola",
    "Beverages > Soft Drinks > Cola > Zero Sugar Cola",
    "Pantry > Packaged Seafood > Other Packaged Seafood",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryTree;

    #[test]
    fn test_sample_categories_load() {
        let tree = CategoryTree::from_paths(SAMPLE_CATEGORIES);
        assert_eq!(
            tree.get_children("root"),
            vec![
                "Beverages",
                "Apparel & Accessories",
                "Pantry",
                "Sporting Goods",
                "Household Supplies",
            ]
        );
        assert_eq!(tree.get_all_categories().len(), SAMPLE_CATEGORIES.len());
    }

    #[test]
    fn test_same_name_under_different_parents() {
        let tree = CategoryTree::from_paths(SAMPLE_CATEGORIES);
        assert!(tree
            .get_category_node("Beverages > Carbonated Drinks > Cola")
            .is_some());
        assert!(tree
            .get_category_node("Beverages > Soft Drinks > Cola")
            .is_some());
    }
}
