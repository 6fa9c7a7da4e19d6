use crate::cmd::open_store;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use subline_core::store::{parse_import, AssignmentStore};
use subline_core::types::DateRange;

#[derive(Subcommand)]
pub enum ActivitySubcommand {
    /// Import activities from a JSON array
    Import { file: PathBuf },
    /// List activities, optionally within a date range
    List {
        #[arg(long, requires = "to")]
        from: Option<String>,
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: ActivitySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ActivitySubcommand::Import { file } => import(root, &file, json),
        ActivitySubcommand::List { from, to } => list(root, from.as_deref(), to.as_deref(), json),
    }
}

fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let items = parse_import(&data).context("invalid activity file")?;
    let (_, store) = open_store(root)?;
    let imported = store.import_items(&items)?;

    if json {
        print_json(&serde_json::json!({ "imported": imported }))?;
    } else {
        println!("Imported {imported} activities");
    }
    Ok(())
}

fn list(root: &Path, from: Option<&str>, to: Option<&str>, json: bool) -> anyhow::Result<()> {
    let range = match (from, to) {
        (None, None) => None,
        _ => Some(DateRange::parse(from, to)?),
    };
    let (_, store) = open_store(root)?;
    let items = store.list_items(range)?;

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No activities.");
        return Ok(());
    }
    let rows = items
        .iter()
        .map(|i| {
            vec![
                i.id.to_string(),
                i.scheduled_date.to_string(),
                i.status.to_string(),
                i.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "DATE", "STATUS", "TITLE"], rows);
    Ok(())
}
