//! Domain entities: terms, layout positions and derived tree nodes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Stable identifier of a term in the taxonomy store.
pub type TermId = u64;

/// Parent sentinel for top-level categories.
pub const ROOT: TermId = 0;

/// Layout hint attached to a category (e.g. mega menu column).
///
/// Orthogonal to hierarchy and rank: changing it never moves a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Right => "right",
        }
    }

    /// Parse a position change request.
    ///
    /// `""` means "clear the hint" and yields `None`; `"left"`/`"right"` set it.
    /// Anything else is an invalid argument.
    pub fn parse_request(value: &str) -> Result<Option<Position>, DomainError> {
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl FromStr for Position {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Position::Left),
            "right" => Ok(Position::Right),
            other => Err(DomainError::InvalidArgument(format!(
                "invalid position '{}' (expected 'left', 'right' or '')",
                other
            ))),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category as read from the term store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    /// Containing term, or [`ROOT`]
    pub parent: TermId,
    /// Number of products in the category (display only)
    #[serde(default)]
    pub count: u64,
    /// Rank among siblings
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Term {
    /// Create a term with a slug derived from its name.
    pub fn new(id: TermId, name: impl Into<String>, parent: TermId) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id,
            name,
            slug,
            parent,
            count: 0,
            order: 0,
            position: None,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent == ROOT
    }

    /// Sort key inside a sibling group: rank, then id for equal ranks.
    pub fn sibling_key(&self) -> (i64, TermId) {
        (self.order, self.id)
    }
}

/// Sort a sibling group by rank with a deterministic id tie-break.
pub fn sort_siblings(terms: &mut [Term]) {
    terms.sort_by_key(Term::sibling_key);
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Node of the derived category tree.
///
/// Built fresh on every query; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    pub parent: TermId,
    pub count: u64,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub has_children: bool,
    /// No term anywhere in the full set names this one as parent
    pub is_childless: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Node without children, as used for shallow listings.
    pub fn leaf(term: &Term, is_childless: bool) -> Self {
        Self::with_children(term, is_childless, Vec::new())
    }

    pub fn with_children(term: &Term, is_childless: bool, children: Vec<TreeNode>) -> Self {
        Self {
            id: term.id,
            name: term.name.clone(),
            slug: term.slug.clone(),
            parent: term.parent,
            count: term.count,
            order: term.order,
            position: term.position,
            has_children: !children.is_empty(),
            is_childless,
            children,
        }
    }

    pub fn child_ids(&self) -> Vec<TermId> {
        self.children.iter().map(|c| c.id).collect()
    }
}

/// One entry of a bulk reorder request (typically a drag-and-drop commit).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    /// Entries without an id are skipped
    #[serde(default)]
    pub id: Option<TermId>,
    /// Reparent target; absent keeps the current parent
    #[serde(default)]
    pub parent: Option<TermId>,
    /// New rank; absent writes 0
    #[serde(default)]
    pub order: Option<i64>,
}

impl ReorderItem {
    pub fn new(id: TermId, parent: Option<TermId>, order: i64) -> Self {
        Self {
            id: Some(id),
            parent,
            order: Some(order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_string_when_parsing_position_request_then_clears() {
        assert_eq!(Position::parse_request("").unwrap(), None);
        assert_eq!(
            Position::parse_request("left").unwrap(),
            Some(Position::Left)
        );
    }

    #[test]
    fn given_unknown_value_when_parsing_position_then_invalid_argument() {
        let err = Position::parse_request("Left").unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn given_name_with_punctuation_when_creating_term_then_slug_is_normalized() {
        let term = Term::new(1, "Shoes & Boots ", ROOT);
        assert_eq!(term.slug, "shoes-boots");
    }

    #[test]
    fn given_equal_orders_when_sorting_siblings_then_id_breaks_tie() {
        let mut terms = vec![
            Term::new(7, "b", ROOT).with_order(1),
            Term::new(3, "a", ROOT).with_order(1),
            Term::new(9, "c", ROOT).with_order(0),
        ];
        sort_siblings(&mut terms);
        let ids: Vec<_> = terms.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![9, 3, 7]);
    }
}
