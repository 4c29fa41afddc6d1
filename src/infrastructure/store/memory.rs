//! In-memory term store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use crate::domain::{Position, Term, TermId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::store::{MetaKeys, StoredTerm, TermTable};
use crate::infrastructure::traits::{TermFilter, TermStore};

/// Term store held entirely in process memory.
///
/// Writes can be made to fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryTermStore {
    table: RwLock<TermTable>,
    keys: MetaKeys,
    simulate_write_error: AtomicBool,
}

impl MemoryTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let keys = MetaKeys::default();
        let records = terms.into_iter().map(|t| StoredTerm::from_term(&t, &keys));
        Self {
            table: RwLock::new(TermTable::from_records(records)),
            keys,
            simulate_write_error: AtomicBool::new(false),
        }
    }

    pub fn with_meta_keys(mut self, keys: MetaKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Add or replace a term.
    pub fn insert(&self, term: Term) -> StoreResult<()> {
        let record = StoredTerm::from_term(&term, &self.keys);
        self.write()?.insert(record);
        Ok(())
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`].
    pub fn simulate_write_error(&self, enabled: bool) {
        self.simulate_write_error.store(enabled, Ordering::SeqCst);
    }

    /// Copy of the stored records, for assertions.
    pub fn snapshot(&self) -> StoreResult<TermTable> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, TermTable>> {
        self.table
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, TermTable>> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write error".into()));
        }
        self.table
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl TermStore for MemoryTermStore {
    fn list_terms(&self, filter: &TermFilter) -> StoreResult<Vec<Term>> {
        Ok(self.read()?.list(filter, &self.keys))
    }

    fn get_term(&self, id: TermId) -> StoreResult<Option<Term>> {
        Ok(self.read()?.get(id, &self.keys))
    }

    fn set_parent(&self, id: TermId, new_parent: TermId) -> StoreResult<()> {
        trace!(id, new_parent, "set_parent");
        self.write()?.set_parent(id, new_parent)
    }

    fn get_order(&self, id: TermId) -> StoreResult<i64> {
        self.read()?.order(id, &self.keys)
    }

    fn set_order(&self, id: TermId, value: i64) -> StoreResult<()> {
        trace!(id, value, "set_order");
        self.write()?.set_order(id, value, &self.keys)
    }

    fn swap_orders(&self, a: TermId, b: TermId) -> StoreResult<()> {
        trace!(a, b, "swap_orders");
        self.write()?.swap_orders(a, b, &self.keys)
    }

    fn get_position(&self, id: TermId) -> StoreResult<Option<Position>> {
        self.read()?.position(id, &self.keys)
    }

    fn set_position(&self, id: TermId, position: Option<Position>) -> StoreResult<()> {
        self.write()?.set_position(id, position, &self.keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ROOT;

    #[test]
    fn given_simulated_error_when_writing_then_unavailable_and_reads_still_work() {
        let store = MemoryTermStore::with_terms(vec![Term::new(1, "a", ROOT)]);
        store.simulate_write_error(true);

        let result = store.set_order(1, 5);

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.get_order(1).unwrap(), 0);
    }

    #[test]
    fn given_custom_meta_keys_when_writing_then_records_use_them() {
        let keys = MetaKeys {
            order: "rank".into(),
            position: "column".into(),
        };
        let store = MemoryTermStore::new().with_meta_keys(keys);
        store.insert(Term::new(1, "a", ROOT)).unwrap();

        store.set_order(1, 3).unwrap();
        store.set_position(1, Some(Position::Right)).unwrap();

        let table = store.snapshot().unwrap();
        let record = table.into_file().terms.remove(0);
        assert_eq!(record.meta.get("rank").map(String::as_str), Some("3"));
        assert_eq!(record.meta.get("column").map(String::as_str), Some("right"));
    }
}
