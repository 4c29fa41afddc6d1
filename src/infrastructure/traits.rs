//! I/O boundary traits for testability
//!
//! These traits abstract the taxonomy store and the filesystem it may live on,
//! allowing services to be tested against in-memory implementations.

use std::io;
use std::path::Path;

use crate::domain::{Position, Term, TermId};
use crate::infrastructure::error::StoreResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Selection of terms for [`TermStore::list_terms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermFilter {
    /// Only terms with this parent; `None` lists every term
    pub parent: Option<TermId>,
    /// Include terms whose product count is zero
    pub include_empty: bool,
}

impl TermFilter {
    /// Every term, empty ones included.
    pub fn all() -> Self {
        Self {
            parent: None,
            include_empty: true,
        }
    }

    /// The sibling group below `parent`, empty ones included.
    pub fn children_of(parent: TermId) -> Self {
        Self {
            parent: Some(parent),
            include_empty: true,
        }
    }

    pub fn matches(&self, term: &Term) -> bool {
        self.parent.map_or(true, |p| term.parent == p) && (self.include_empty || term.count > 0)
    }
}

/// Taxonomy store adapter.
///
/// Provides the read/write primitives the order engine depends on. No
/// ordering or cycle logic lives here. Writes to an unknown id fail with
/// [`StoreError::TermNotFound`](crate::infrastructure::StoreError::TermNotFound).
pub trait TermStore: Send + Sync {
    /// List terms matching the filter, ordered by rank (ties by id).
    fn list_terms(&self, filter: &TermFilter) -> StoreResult<Vec<Term>>;

    /// Get a term by id.
    fn get_term(&self, id: TermId) -> StoreResult<Option<Term>>;

    /// Point a term at a new parent ([`ROOT`](crate::domain::ROOT) for top level).
    fn set_parent(&self, id: TermId, new_parent: TermId) -> StoreResult<()>;

    /// Read the rank attribute; unset reads as 0.
    fn get_order(&self, id: TermId) -> StoreResult<i64>;

    /// Write the rank attribute.
    fn set_order(&self, id: TermId, value: i64) -> StoreResult<()>;

    /// Exchange the ranks of two terms.
    ///
    /// The default issues two independent writes: if the second one fails the
    /// two terms are left with the same rank. Stores with a native way to
    /// apply both writes together should override this.
    fn swap_orders(&self, a: TermId, b: TermId) -> StoreResult<()> {
        let order_a = self.get_order(a)?;
        let order_b = self.get_order(b)?;
        self.set_order(a, order_b)?;
        self.set_order(b, order_a)
    }

    /// Read the layout hint.
    fn get_position(&self, id: TermId) -> StoreResult<Option<Position>>;

    /// Write the layout hint; `None` deletes the attribute.
    fn set_position(&self, id: TermId, position: Option<Position>) -> StoreResult<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
