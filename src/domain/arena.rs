use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::entities::{Term, TermId, ROOT};

/// Arena slot holding one term and its resolved links.
#[derive(Debug)]
pub struct ArenaNode {
    pub term: Term,
    /// Index of parent node in the arena, None for roots and orphans
    pub parent: Option<Index>,
    /// Indices of child nodes, sorted by rank
    pub children: Vec<Index>,
}

/// Arena-based index over a flat term list.
///
/// Resolves every parent pointer once so that tree assembly does not have to
/// re-partition the input per level. Terms whose parent is neither [`ROOT`] nor
/// present in the input stay in the arena but are unreachable from the roots.
#[derive(Debug)]
pub struct TermArena {
    arena: Arena<ArenaNode>,
    by_id: HashMap<TermId, Index>,
    roots: Vec<Index>,
}

impl Default for TermArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TermArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            by_id: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Build the arena from flat terms and link parents to children.
    #[instrument(level = "trace", skip(terms), fields(terms = terms.len()))]
    pub fn from_terms(terms: &[Term]) -> Self {
        let mut tree = Self::new();
        for term in terms {
            if tree.by_id.contains_key(&term.id) {
                trace!("skipping duplicate term {}", term.id);
                continue;
            }
            tree.insert_node(term.clone());
        }

        let links: Vec<(Index, TermId)> = tree
            .arena
            .iter()
            .map(|(idx, node)| (idx, node.term.parent))
            .collect();
        for (idx, parent_id) in links {
            if parent_id == ROOT {
                tree.roots.push(idx);
            } else if let Some(&parent_idx) = tree.by_id.get(&parent_id) {
                tree.attach(idx, parent_idx);
            } else {
                trace!(
                    "term {} references missing parent {}",
                    tree.arena[idx].term.id,
                    parent_id
                );
            }
        }

        tree.sort_links();
        tree
    }

    fn insert_node(&mut self, term: Term) -> Index {
        let id = term.id;
        let idx = self.arena.insert(ArenaNode {
            term,
            parent: None,
            children: Vec::new(),
        });
        self.by_id.insert(id, idx);
        idx
    }

    fn attach(&mut self, child: Index, parent: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    fn sort_links(&mut self) {
        let arena = &self.arena;
        let key = |idx: &Index| arena[*idx].term.sibling_key();

        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_key(key);

        let sorted: Vec<(Index, Vec<Index>)> = arena
            .iter()
            .filter(|(_, node)| node.children.len() > 1)
            .map(|(idx, node)| {
                let mut children = node.children.clone();
                children.sort_by_key(key);
                (idx, children)
            })
            .collect();

        self.roots = roots;
        for (idx, children) in sorted {
            self.arena[idx].children = children;
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// Number of terms held, reachable or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over all trees reachable from the roots.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TermArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TermArena) -> Self {
        let stack = arena.roots().iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a ArenaNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
