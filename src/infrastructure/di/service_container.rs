//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::{CategoryApi, OrderService, QueryService};
use crate::config::Settings;
use crate::infrastructure::store::JsonFileTermStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, TermStore};

/// Container holding the store and building services over it.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Term store shared by all services
    pub store: Arc<dyn TermStore>,
}

impl ServiceContainer {
    /// Create a container backed by the JSON file store from the settings.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(
            JsonFileTermStore::new(settings.store_path.clone(), fs.clone())
                .with_meta_keys(settings.meta_keys()),
        );
        Self::with_deps(settings, fs, store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, store: Arc<dyn TermStore>) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            store,
        }
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.store.clone()).with_max_depth(self.settings.max_depth)
    }

    pub fn query_service(&self) -> QueryService {
        QueryService::new(self.store.clone())
    }

    pub fn api(&self) -> CategoryApi {
        CategoryApi::new(self.order_service(), self.query_service())
    }
}
