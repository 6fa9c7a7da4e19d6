use crate::cmd::open_store;
use crate::output::print_json;
use std::path::Path;
use subline_core::assign::{assign, AssignRequest};

pub fn run(
    root: &Path,
    users: Vec<i64>,
    from: &str,
    to: &str,
    count: &str,
    json: bool,
) -> anyhow::Result<()> {
    let (config, store) = open_store(root)?;
    let count = serde_json::Value::String(count.to_string());
    let request = AssignRequest::from_raw(
        Some(users),
        Some(from),
        Some(to),
        Some(&count),
        config.assignment.max_count,
    )?;
    let outcome = assign(&store, &request, chrono::Utc::now())?;

    if json {
        print_json(&outcome)?;
    } else {
        println!("{} ({} records)", outcome.message, outcome.assigned);
    }
    Ok(())
}
