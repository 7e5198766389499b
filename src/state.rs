use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::store::DocumentStore;

/// Shared handler state: the store handle injected at startup plus the
/// configuration it was built from.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
