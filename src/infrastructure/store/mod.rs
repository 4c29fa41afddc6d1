//! # Term store adapters
//!
//! Concrete [`TermStore`](crate::infrastructure::traits::TermStore)
//! implementations. Both keep terms the way a taxonomy backend does: a record
//! per term with a parent pointer and a free-form metadata map. Rank and layout
//! hint are metadata entries under configurable keys.
//!
//! - [`memory::MemoryTermStore`]: in-process store for tests and embedding.
//! - [`json_file::JsonFileTermStore`]: a JSON document on disk, used by the CLI.
//!
//! ## Storage Layout
//!
//! ```text
//! {
//!   "terms": [
//!     { "id": 10, "name": "Shoes", "slug": "shoes", "parent": 0, "count": 4,
//!       "meta": { "order": "1", "merida_mega_menu_column_position": "left" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{sort_siblings, Position, Term, TermId, ROOT};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::TermFilter;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileTermStore;
pub use memory::MemoryTermStore;

pub const DEFAULT_ORDER_KEY: &str = "order";
pub const DEFAULT_POSITION_KEY: &str = "merida_mega_menu_column_position";

/// Metadata keys under which rank and layout hint are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaKeys {
    pub order: String,
    pub position: String,
}

impl Default for MetaKeys {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER_KEY.to_string(),
            position: DEFAULT_POSITION_KEY.to_string(),
        }
    }
}

/// Persisted shape of a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTerm {
    pub id: TermId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent: TermId,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl StoredTerm {
    pub fn from_term(term: &Term, keys: &MetaKeys) -> Self {
        let mut meta = BTreeMap::new();
        meta.insert(keys.order.clone(), term.order.to_string());
        if let Some(position) = term.position {
            meta.insert(keys.position.clone(), position.as_str().to_string());
        }
        Self {
            id: term.id,
            name: term.name.clone(),
            slug: term.slug.clone(),
            parent: term.parent,
            count: term.count,
            meta,
        }
    }

    /// Rank from metadata; missing or non-numeric values read as 0.
    pub fn order(&self, keys: &MetaKeys) -> i64 {
        self.meta
            .get(&keys.order)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Layout hint from metadata; unrecognized values read as absent.
    pub fn position(&self, keys: &MetaKeys) -> Option<Position> {
        self.meta.get(&keys.position).and_then(|v| v.parse().ok())
    }

    pub fn to_term(&self, keys: &MetaKeys) -> Term {
        Term {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            parent: self.parent,
            count: self.count,
            order: self.order(keys),
            position: self.position(keys),
        }
    }
}

/// Document format of the JSON file store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermFile {
    #[serde(default)]
    pub terms: Vec<StoredTerm>,
}

/// Id-indexed term records with the store primitives shared by all adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermTable {
    records: BTreeMap<TermId, StoredTerm>,
}

impl TermTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = StoredTerm>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    pub fn into_file(self) -> TermFile {
        TermFile {
            terms: self.records.into_values().collect(),
        }
    }

    pub fn insert(&mut self, record: StoredTerm) {
        self.records.insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn list(&self, filter: &TermFilter, keys: &MetaKeys) -> Vec<Term> {
        let mut terms: Vec<Term> = self
            .records
            .values()
            .map(|r| r.to_term(keys))
            .filter(|t| filter.matches(t))
            .collect();
        sort_siblings(&mut terms);
        terms
    }

    pub fn get(&self, id: TermId, keys: &MetaKeys) -> Option<Term> {
        self.records.get(&id).map(|r| r.to_term(keys))
    }

    fn record(&self, id: TermId) -> StoreResult<&StoredTerm> {
        self.records.get(&id).ok_or(StoreError::TermNotFound(id))
    }

    fn record_mut(&mut self, id: TermId) -> StoreResult<&mut StoredTerm> {
        self.records.get_mut(&id).ok_or(StoreError::TermNotFound(id))
    }

    pub fn set_parent(&mut self, id: TermId, new_parent: TermId) -> StoreResult<()> {
        if new_parent != ROOT && !self.records.contains_key(&new_parent) {
            return Err(StoreError::TermNotFound(new_parent));
        }
        self.record_mut(id)?.parent = new_parent;
        Ok(())
    }

    pub fn order(&self, id: TermId, keys: &MetaKeys) -> StoreResult<i64> {
        Ok(self.record(id)?.order(keys))
    }

    pub fn set_order(&mut self, id: TermId, value: i64, keys: &MetaKeys) -> StoreResult<()> {
        self.record_mut(id)?
            .meta
            .insert(keys.order.clone(), value.to_string());
        Ok(())
    }

    /// Exchange two ranks; both ids are checked before anything is written.
    pub fn swap_orders(&mut self, a: TermId, b: TermId, keys: &MetaKeys) -> StoreResult<()> {
        let order_a = self.order(a, keys)?;
        let order_b = self.order(b, keys)?;
        self.set_order(a, order_b, keys)?;
        self.set_order(b, order_a, keys)
    }

    pub fn position(&self, id: TermId, keys: &MetaKeys) -> StoreResult<Option<Position>> {
        Ok(self.record(id)?.position(keys))
    }

    pub fn set_position(
        &mut self,
        id: TermId,
        position: Option<Position>,
        keys: &MetaKeys,
    ) -> StoreResult<()> {
        let record = self.record_mut(id)?;
        match position {
            Some(p) => {
                record
                    .meta
                    .insert(keys.position.clone(), p.as_str().to_string());
            }
            None => {
                record.meta.remove(&keys.position);
            }
        }
        Ok(())
    }
}
