//! API server state

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::executor::{DryRunExecutor, Executor};

/// Shared, read-only state handed to every route group
#[derive(Clone)]
pub struct AppState {
    /// Integrations available to this node
    pub catalog: Arc<Catalog>,

    /// Backend running execution requests
    pub executor: Arc<dyn Executor>,
}

impl AppState {
    pub fn new(catalog: Catalog, executor: Arc<dyn Executor>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            executor,
        }
    }

    /// State for a node that resolves calls without running them
    pub fn dry_run(catalog: Catalog) -> Self {
        Self::new(catalog, Arc::new(DryRunExecutor))
    }
}
