use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use subline_core::{config::Config, io, paths};

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    io::ensure_dir(&paths::subline_dir(root)).context("failed to create .subline/")?;

    let created = Config::write_default(root).context("failed to write config")?;

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config_created": created,
        }))?;
    } else if created {
        println!("Initialized subline in {}", root.display());
    } else {
        println!(
            "Already initialized: {}",
            paths::config_path(root).display()
        );
    }
    Ok(())
}
