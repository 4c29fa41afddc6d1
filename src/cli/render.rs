//! Terminal rendering of category trees

use termtree::Tree;

use crate::domain::{CategoryTree, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

/// One-line label: `Name #id (order N, K products) [left]`.
pub fn label(node: &TreeNode) -> String {
    let mut label = format!(
        "{} #{} (order {}, {} products)",
        node.name, node.id, node.order, node.count
    );
    if let Some(position) = node.position {
        label.push_str(&format!(" [{}]", position));
    }
    label
}

impl TreeNodeConvert for TreeNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(label(self)).with_leaves(leaves)
    }
}

impl TreeNodeConvert for CategoryTree {
    fn to_tree_string(&self) -> Tree<String> {
        match self {
            CategoryTree::Empty => Tree::new("No categories".to_string()),
            CategoryTree::Roots(roots) => {
                let leaves: Vec<_> = roots.iter().map(|r| r.to_tree_string()).collect();
                Tree::new("categories".to_string()).with_leaves(leaves)
            }
        }
    }
}
