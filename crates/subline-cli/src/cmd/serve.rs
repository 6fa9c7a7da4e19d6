use anyhow::Context;
use std::path::Path;
use subline_server::AppState;

pub fn run(root: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let state = AppState::open(root).context("failed to open project state")?;
    let port = port.unwrap_or(state.config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(subline_server::serve(state, port))
}
