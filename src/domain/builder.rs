//! Tree builder: assembles flat terms into the nested, rank-ordered category tree.

use std::collections::{BTreeSet, HashSet};

use generational_arena::Index;
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

use crate::domain::arena::TermArena;
use crate::domain::entities::{Term, TermId, TreeNode, ROOT};

/// Result of assembling the full category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryTree {
    /// There are no categories reachable from the root.
    Empty,
    /// Top-level categories in rank order, with nested children.
    Roots(Vec<TreeNode>),
}

impl CategoryTree {
    pub fn is_empty(&self) -> bool {
        matches!(self, CategoryTree::Empty)
    }

    pub fn roots(&self) -> &[TreeNode] {
        match self {
            CategoryTree::Empty => &[],
            CategoryTree::Roots(nodes) => nodes,
        }
    }

    pub fn into_nodes(self) -> Vec<TreeNode> {
        match self {
            CategoryTree::Empty => Vec::new(),
            CategoryTree::Roots(nodes) => nodes,
        }
    }

    pub fn root_ids(&self) -> Vec<TermId> {
        self.roots().iter().map(|n| n.id).collect()
    }

    /// Pre-order traversal over every node.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack: Vec<&TreeNode> = self.roots().iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find(&self, id: TermId) -> Option<&TreeNode> {
        self.iter().find(|n| n.id == id)
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &TreeNode) -> usize {
            1 + node.children.iter().map(depth_of).max().unwrap_or(0)
        }
        self.roots().iter().map(depth_of).max().unwrap_or(0)
    }
}

impl From<Vec<TreeNode>> for CategoryTree {
    fn from(nodes: Vec<TreeNode>) -> Self {
        if nodes.is_empty() {
            CategoryTree::Empty
        } else {
            CategoryTree::Roots(nodes)
        }
    }
}

impl Serialize for CategoryTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.roots())
    }
}

/// Constructs category trees from flat term lists.
///
/// Stateless: every call works only on the terms it is given, so the result
/// always reflects whatever the store returned for the current request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the nested tree rooted at [`ROOT`].
    ///
    /// Siblings are ordered by rank with ascending id as tie-break. The
    /// childless flag is computed over the whole input, not per subtree.
    /// Yields [`CategoryTree::Empty`] when nothing hangs off the root.
    #[instrument(level = "debug", skip(self, terms), fields(terms = terms.len()))]
    pub fn build_tree(&self, terms: &[Term]) -> CategoryTree {
        let childless = self.childless_ids(terms);
        let arena = TermArena::from_terms(terms);

        let roots: Vec<TreeNode> = arena
            .roots()
            .iter()
            .filter_map(|&idx| materialize(&arena, idx, &childless))
            .collect();

        debug!("build_tree: {} roots, depth {}", roots.len(), arena.depth());
        CategoryTree::from(roots)
    }

    /// Shallow view of the top-level categories only.
    ///
    /// Every node has no children and `has_children == false`, even when the
    /// term has descendants in the input.
    pub fn build_root_only(&self, terms: &[Term]) -> Vec<TreeNode> {
        let childless = self.childless_ids(terms);
        let mut roots: Vec<Term> = terms.iter().filter(|t| t.is_root()).cloned().collect();
        roots.sort_by_key(Term::sibling_key);
        self.format_shallow(&roots, &childless)
    }

    /// Format already selected terms as childless-annotated leaves, keeping
    /// their order.
    pub fn format_shallow(&self, terms: &[Term], childless: &BTreeSet<TermId>) -> Vec<TreeNode> {
        terms
            .iter()
            .map(|t| TreeNode::leaf(t, childless.contains(&t.id)))
            .collect()
    }

    /// Ids that no term in the input names as its parent.
    pub fn childless_ids(&self, terms: &[Term]) -> BTreeSet<TermId> {
        let parents: HashSet<TermId> = terms
            .iter()
            .map(|t| t.parent)
            .filter(|&p| p != ROOT)
            .collect();

        terms
            .iter()
            .map(|t| t.id)
            .filter(|id| !parents.contains(id))
            .collect()
    }
}

fn materialize(arena: &TermArena, idx: Index, childless: &BTreeSet<TermId>) -> Option<TreeNode> {
    let node = arena.get_node(idx)?;
    let children = node
        .children
        .iter()
        .filter_map(|&child| materialize(arena, child, childless))
        .collect();
    Some(TreeNode::with_children(
        &node.term,
        childless.contains(&node.term.id),
        children,
    ))
}
