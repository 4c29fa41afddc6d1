//! Term store backed by a single JSON document on disk

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, instrument};

use crate::domain::{Position, Term, TermId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::store::{MetaKeys, StoredTerm, TermFile, TermTable};
use crate::infrastructure::traits::{FileSystem, TermFilter, TermStore};

/// JSON file store.
///
/// Every call re-reads the file. Writes rewrite the whole document through a
/// temporary sibling file and a rename. A missing file reads as an empty store.
pub struct JsonFileTermStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    keys: MetaKeys,
    write_lock: Mutex<()>,
}

impl JsonFileTermStore {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            keys: MetaKeys::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_meta_keys(mut self, keys: MetaKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored document with the given terms.
    pub fn import(&self, terms: &[Term]) -> StoreResult<()> {
        let _guard = self.lock()?;
        let records = terms.iter().map(|t| StoredTerm::from_term(t, &self.keys));
        self.save(TermTable::from_records(records))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("json store lock poisoned".into()))
    }

    fn load(&self) -> StoreResult<TermTable> {
        if !self.fs.exists(&self.path) {
            debug!("store file {} missing, reading as empty", self.path.display());
            return Ok(TermTable::new());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| StoreError::io(format!("reading {}", self.path.display()), e))?;
        if content.trim().is_empty() {
            return Ok(TermTable::new());
        }
        let file: TermFile =
            serde_json::from_str(&content).map_err(|e| StoreError::Serialization {
                context: format!("parsing {}", self.path.display()),
                source: e,
            })?;
        Ok(TermTable::from_records(file.terms))
    }

    fn save(&self, table: TermTable) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(&table.into_file()).map_err(|e| {
            StoreError::Serialization {
                context: format!("encoding {}", self.path.display()),
                source: e,
            }
        })?;

        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| StoreError::io(format!("creating parent of {}", self.path.display()), e))?;

        let tmp = self.path.with_extension("json.tmp");
        self.fs
            .write(&tmp, &content)
            .map_err(|e| StoreError::io(format!("writing {}", tmp.display()), e))?;
        self.fs
            .rename(&tmp, &self.path)
            .map_err(|e| StoreError::io(format!("replacing {}", self.path.display()), e))
    }

    /// Load, apply, save while holding the write lock.
    fn update<F>(&self, apply: F) -> StoreResult<()>
    where
        F: FnOnce(&mut TermTable) -> StoreResult<()>,
    {
        let _guard = self.lock()?;
        let mut table = self.load()?;
        apply(&mut table)?;
        self.save(table)
    }
}

impl TermStore for JsonFileTermStore {
    fn list_terms(&self, filter: &TermFilter) -> StoreResult<Vec<Term>> {
        Ok(self.load()?.list(filter, &self.keys))
    }

    fn get_term(&self, id: TermId) -> StoreResult<Option<Term>> {
        Ok(self.load()?.get(id, &self.keys))
    }

    #[instrument(level = "trace", skip(self))]
    fn set_parent(&self, id: TermId, new_parent: TermId) -> StoreResult<()> {
        self.update(|t| t.set_parent(id, new_parent))
    }

    fn get_order(&self, id: TermId) -> StoreResult<i64> {
        self.load()?.order(id, &self.keys)
    }

    #[instrument(level = "trace", skip(self))]
    fn set_order(&self, id: TermId, value: i64) -> StoreResult<()> {
        self.update(|t| t.set_order(id, value, &self.keys))
    }

    #[instrument(level = "trace", skip(self))]
    fn swap_orders(&self, a: TermId, b: TermId) -> StoreResult<()> {
        self.update(|t| t.swap_orders(a, b, &self.keys))
    }

    fn get_position(&self, id: TermId) -> StoreResult<Option<Position>> {
        self.load()?.position(id, &self.keys)
    }

    #[instrument(level = "trace", skip(self))]
    fn set_position(&self, id: TermId, position: Option<Position>) -> StoreResult<()> {
        self.update(|t| t.set_position(id, position, &self.keys))
    }
}
