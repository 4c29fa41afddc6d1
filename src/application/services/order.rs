//! Order engine
//!
//! Sibling moves, promotion/demotion across levels, direct reparenting with
//! cycle protection, direct rank and layout hint writes, and bulk reorder.
//!
//! Every operation reads the current state from the store, validates it,
//! and writes the new values back. There is no transaction around that
//! sequence: two concurrent moves in the same sibling group may interleave.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::{DomainError, Position, ReorderItem, Term, TermId, ROOT};
use crate::infrastructure::traits::{TermFilter, TermStore};

/// Upper bound on parent-chain walks.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Result of a mutating operation that reached the store.
///
/// A rejection means a business rule refused the request; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected(DomainError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn rejection(&self) -> Option<&DomainError> {
        match self {
            Outcome::Applied => None,
            Outcome::Rejected(e) => Some(e),
        }
    }

    /// Turn a rejection into an error, for callers that treat it as a failure.
    pub fn into_result(self) -> Result<(), DomainError> {
        match self {
            Outcome::Applied => Ok(()),
            Outcome::Rejected(e) => Err(e),
        }
    }
}

impl From<DomainError> for Outcome {
    fn from(e: DomainError) -> Self {
        Outcome::Rejected(e)
    }
}

/// Summary of a bulk reorder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// Items with an id that were processed
    pub attempted: usize,
    /// Items without an id
    pub skipped: usize,
    /// Attempted items where at least one write failed
    pub failed: usize,
}

/// Service mutating rank and hierarchy of categories.
pub struct OrderService {
    store: Arc<dyn TermStore>,
    max_depth: usize,
}

impl OrderService {
    pub fn new(store: Arc<dyn TermStore>) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Swap rank with the preceding sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn move_up(&self, id: TermId) -> ApplicationResult<Outcome> {
        let Some(term) = self.store.get_term(id)? else {
            return Ok(DomainError::NotFound(id).into());
        };
        let siblings = self.siblings(term.parent)?;
        let Some(idx) = index_of(&siblings, id) else {
            return Ok(DomainError::NotFound(id).into());
        };
        if idx == 0 {
            return Ok(DomainError::InvalidTransition {
                id,
                reason: "already first among its siblings",
            }
            .into());
        }

        let other = siblings[idx - 1].id;
        debug!("move_up: swapping {} with {}", id, other);
        self.store.swap_orders(id, other)?;
        Ok(Outcome::Applied)
    }

    /// Swap rank with the following sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn move_down(&self, id: TermId) -> ApplicationResult<Outcome> {
        let Some(term) = self.store.get_term(id)? else {
            return Ok(DomainError::NotFound(id).into());
        };
        let siblings = self.siblings(term.parent)?;
        let Some(idx) = index_of(&siblings, id) else {
            return Ok(DomainError::NotFound(id).into());
        };
        if idx + 1 >= siblings.len() {
            return Ok(DomainError::InvalidTransition {
                id,
                reason: "already last among its siblings",
            }
            .into());
        }

        let other = siblings[idx + 1].id;
        debug!("move_down: swapping {} with {}", id, other);
        self.store.swap_orders(id, other)?;
        Ok(Outcome::Applied)
    }

    /// Promote: become a sibling of the current parent, ranked last.
    #[instrument(level = "debug", skip(self))]
    pub fn move_left(&self, id: TermId) -> ApplicationResult<Outcome> {
        let Some(term) = self.store.get_term(id)? else {
            return Ok(DomainError::NotFound(id).into());
        };
        if term.is_root() {
            return Ok(DomainError::InvalidTransition {
                id,
                reason: "already at top level",
            }
            .into());
        }
        let Some(parent) = self.store.get_term(term.parent)? else {
            return Ok(DomainError::NotFound(term.parent).into());
        };

        self.reparent_to_end(id, parent.parent)
    }

    /// Demote: become the last child of the preceding sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn move_right(&self, id: TermId) -> ApplicationResult<Outcome> {
        let Some(term) = self.store.get_term(id)? else {
            return Ok(DomainError::NotFound(id).into());
        };
        let siblings = self.siblings(term.parent)?;
        let Some(idx) = index_of(&siblings, id) else {
            return Ok(DomainError::NotFound(id).into());
        };
        if idx == 0 {
            return Ok(DomainError::InvalidTransition {
                id,
                reason: "no preceding sibling to nest under",
            }
            .into());
        }

        self.reparent_to_end(id, siblings[idx - 1].id)
    }

    /// Write a rank as given. Uniqueness among siblings is not enforced.
    #[instrument(level = "debug", skip(self))]
    pub fn set_order(&self, id: TermId, new_order: i64) -> ApplicationResult<Outcome> {
        if self.store.get_term(id)?.is_none() {
            return Ok(DomainError::NotFound(id).into());
        }
        self.store.set_order(id, new_order)?;
        Ok(Outcome::Applied)
    }

    /// Move a term under `new_parent` ([`ROOT`] for top level), ranked last.
    ///
    /// Refused when the new parent is the term itself or one of its
    /// descendants. The check and the write are not atomic.
    #[instrument(level = "debug", skip(self))]
    pub fn set_parent(&self, id: TermId, new_parent: TermId) -> ApplicationResult<Outcome> {
        if new_parent == id {
            return Ok(DomainError::CycleRejected { id, new_parent }.into());
        }
        if self.store.get_term(id)?.is_none() {
            return Ok(DomainError::NotFound(id).into());
        }
        if new_parent != ROOT && self.store.get_term(new_parent)?.is_none() {
            return Ok(DomainError::NotFound(new_parent).into());
        }
        if self.is_descendant(new_parent, id)? {
            return Ok(DomainError::CycleRejected { id, new_parent }.into());
        }

        self.reparent_to_end(id, new_parent)
    }

    /// Set (`"left"`, `"right"`) or clear (`""`) the layout hint.
    #[instrument(level = "debug", skip(self))]
    pub fn set_position(&self, id: TermId, position: &str) -> ApplicationResult<Outcome> {
        let position = match Position::parse_request(position) {
            Ok(p) => p,
            Err(e) => return Ok(e.into()),
        };
        if self.store.get_term(id)?.is_none() {
            return Ok(DomainError::NotFound(id).into());
        }
        self.store.set_position(id, position)?;
        Ok(Outcome::Applied)
    }

    /// Apply a batch of parent/rank assignments, typically from a drag and drop.
    ///
    /// Reparents without a cycle check and never fails: item failures are
    /// logged and counted in the report.
    #[instrument(level = "debug", skip(self, items), fields(items = items.len()))]
    pub fn bulk_reorder(&self, items: &[ReorderItem]) -> BulkReport {
        let mut report = BulkReport::default();
        for item in items {
            let Some(id) = item.id else {
                report.skipped += 1;
                continue;
            };
            report.attempted += 1;

            let mut failed = false;
            if let Some(parent) = item.parent {
                if let Err(e) = self.store.set_parent(id, parent) {
                    warn!("bulk_reorder: set_parent({}, {}) failed: {}", id, parent, e);
                    failed = true;
                }
            }
            let order = item.order.unwrap_or(0);
            if let Err(e) = self.store.set_order(id, order) {
                warn!("bulk_reorder: set_order({}, {}) failed: {}", id, order, e);
                failed = true;
            }
            if failed {
                report.failed += 1;
            }
        }
        debug!("bulk_reorder: {:?}", report);
        report
    }

    /// Whether `ancestor` appears on the parent chain of `candidate`.
    ///
    /// An unresolvable term ends the walk with `false`. A chain longer than
    /// the configured maximum depth counts as a descendant.
    pub fn is_descendant(&self, candidate: TermId, ancestor: TermId) -> ApplicationResult<bool> {
        let mut current = candidate;
        let mut steps = 0;
        while current != ROOT {
            if steps >= self.max_depth {
                warn!(
                    "is_descendant: parent chain of {} exceeds {} levels",
                    candidate, self.max_depth
                );
                return Ok(true);
            }
            let Some(term) = self.store.get_term(current)? else {
                return Ok(false);
            };
            if term.parent == ancestor {
                return Ok(true);
            }
            current = term.parent;
            steps += 1;
        }
        Ok(false)
    }

    fn siblings(&self, parent: TermId) -> ApplicationResult<Vec<Term>> {
        Ok(self.store.list_terms(&TermFilter::children_of(parent))?)
    }

    /// Highest rank in the group under `parent`, not counting `exclude`; 0 if empty.
    fn max_order(&self, parent: TermId, exclude: TermId) -> ApplicationResult<i64> {
        Ok(self
            .siblings(parent)?
            .iter()
            .filter(|t| t.id != exclude)
            .map(|t| t.order)
            .max()
            .unwrap_or(0))
    }

    /// Rank is computed before any write, so a full group leaves the term untouched.
    fn reparent_to_end(&self, id: TermId, new_parent: TermId) -> ApplicationResult<Outcome> {
        let Some(order) = self.max_order(new_parent, id)?.checked_add(1) else {
            return Ok(DomainError::InvalidArgument("rank overflow".into()).into());
        };
        debug!("reparent: {} -> parent {}, order {}", id, new_parent, order);
        self.store.set_parent(id, new_parent)?;
        self.store.set_order(id, order)?;
        Ok(Outcome::Applied)
    }
}

fn index_of(siblings: &[Term], id: TermId) -> Option<usize> {
    siblings.iter().position(|t| t.id == id)
}
