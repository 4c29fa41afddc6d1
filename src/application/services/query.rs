//! Query facade: read-only views of the category tree
//!
//! Every call re-reads the store and rebuilds the view; nothing is cached.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{CategoryTree, Position, Term, TermId, TreeBuilder, TreeNode, ROOT};
use crate::infrastructure::traits::{TermFilter, TermStore};
use crate::infrastructure::StoreError;

/// Initial state for an ordering UI: the full tree plus the childless ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySnapshot {
    pub categories: CategoryTree,
    pub childless_ids: BTreeSet<TermId>,
}

pub struct QueryService {
    store: Arc<dyn TermStore>,
    builder: TreeBuilder,
}

impl QueryService {
    pub fn new(store: Arc<dyn TermStore>) -> Self {
        Self {
            store,
            builder: TreeBuilder::new(),
        }
    }

    fn all_terms(&self) -> ApplicationResult<Vec<Term>> {
        Ok(self.store.list_terms(&TermFilter::all())?)
    }

    /// Full nested tree, empty categories included.
    #[instrument(level = "debug", skip(self))]
    pub fn get_tree(&self) -> ApplicationResult<CategoryTree> {
        let terms = self.all_terms()?;
        Ok(self.builder.build_tree(&terms))
    }

    /// Top-level categories as leaves, in rank order.
    #[instrument(level = "debug", skip(self))]
    pub fn get_root_categories(&self) -> ApplicationResult<Vec<TreeNode>> {
        let roots = self.store.list_terms(&TermFilter::children_of(ROOT))?;
        let childless = self.get_childless_ids()?;
        debug!("get_root_categories: {} roots", roots.len());
        Ok(self.builder.format_shallow(&roots, &childless))
    }

    pub fn get_childless_ids(&self) -> ApplicationResult<BTreeSet<TermId>> {
        let terms = self.all_terms()?;
        Ok(self.builder.childless_ids(&terms))
    }

    /// Top-level categories without any subcategory.
    pub fn get_childless_roots(&self) -> ApplicationResult<Vec<TreeNode>> {
        Ok(self
            .get_root_categories()?
            .into_iter()
            .filter(|n| n.is_childless)
            .collect())
    }

    /// Layout hint of a term; `None` if unset or the term is unknown.
    pub fn get_position(&self, id: TermId) -> ApplicationResult<Option<Position>> {
        match self.store.get_position(id) {
            Ok(position) => Ok(position),
            Err(StoreError::TermNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Tree and childless ids from a single read of the store.
    #[instrument(level = "debug", skip(self))]
    pub fn snapshot(&self) -> ApplicationResult<CategorySnapshot> {
        let terms = self.all_terms()?;
        Ok(CategorySnapshot {
            categories: self.builder.build_tree(&terms),
            childless_ids: self.builder.childless_ids(&terms),
        })
    }
}
