use std::path::{Path, PathBuf};
use std::sync::Arc;

use subline_core::config::Config;
use subline_core::db::DbStore;
use subline_core::store::{AssignmentStore, MemoryStore};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub store: Arc<dyn AssignmentStore>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config, store: Arc<dyn AssignmentStore>) -> Self {
        Self {
            root,
            config: Arc::new(config),
            store,
        }
    }

    /// Load `.subline/config.yaml` under `root` and open the configured database.
    pub fn open(root: &Path) -> subline_core::Result<Self> {
        let config = Config::load(root)?;
        let store = DbStore::open(&config.db_path(root))?;
        Ok(Self::new(root.to_path_buf(), config, Arc::new(store)))
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: Config) -> Self {
        Self::new(PathBuf::from("."), config, Arc::new(MemoryStore::new()))
    }
}
