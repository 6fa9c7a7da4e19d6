pub mod activity;
pub mod assign;
pub mod assignments;
pub mod config;
pub mod init;
pub mod serve;
pub mod vtt;

use anyhow::Context;
use std::path::Path;
use subline_core::config::Config;
use subline_core::db::DbStore;

/// Open the project's assignment database using `.subline/config.yaml`.
pub(crate) fn open_store(root: &Path) -> anyhow::Result<(Config, DbStore)> {
    let config = Config::load(root).context("failed to load config")?;
    let path = config.db_path(root);
    let store = DbStore::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    Ok((config, store))
}
