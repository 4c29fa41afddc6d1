//! Shared test setup: logging and sample category sets

use std::env;
use std::sync::{Arc, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{CategoryApi, OrderService, QueryService};
use crate::domain::{Term, ROOT};
use crate::infrastructure::MemoryTermStore;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "catorder=trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Small shop taxonomy:
///
/// ```text
/// 1 Clothing (0)
/// ├── 3 Shirts (0)
/// └── 4 Trousers (1)
///     └── 6 Jeans (0)
/// 2 Shoes (1)
/// 5 Sale (2)
/// ```
pub fn shop_terms() -> Vec<Term> {
    vec![
        Term::new(1, "Clothing", ROOT).with_order(0).with_count(12),
        Term::new(2, "Shoes", ROOT).with_order(1).with_count(4),
        Term::new(5, "Sale", ROOT).with_order(2),
        Term::new(3, "Shirts", 1).with_order(0).with_count(7),
        Term::new(4, "Trousers", 1).with_order(1).with_count(5),
        Term::new(6, "Jeans", 4).with_order(0).with_count(5),
    ]
}

/// Order service, query service and API over one in-memory store.
pub struct Harness {
    pub store: Arc<MemoryTermStore>,
    pub orders: OrderService,
    pub queries: QueryService,
}

impl Harness {
    pub fn new(terms: Vec<Term>) -> Self {
        let store = Arc::new(MemoryTermStore::with_terms(terms));
        Self {
            orders: OrderService::new(store.clone()),
            queries: QueryService::new(store.clone()),
            store,
        }
    }

    pub fn api(&self) -> CategoryApi {
        CategoryApi::new(
            OrderService::new(self.store.clone()),
            QueryService::new(self.store.clone()),
        )
    }
}
