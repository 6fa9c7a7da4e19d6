use crate::cmd::open_store;
use crate::output::{print_json, print_table};
use std::path::Path;
use subline_core::store::AssignmentStore;
use subline_core::types::AssignmentStatus;

/// List a user's assignments, or update one when `update` is given.
pub fn run(
    root: &Path,
    user_id: i64,
    update: Option<(i64, String)>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, store) = open_store(root)?;

    if let Some((item_id, status)) = update {
        let status: AssignmentStatus = status.parse()?;
        let record = store.update_assignment_status(user_id, item_id, status)?;
        if json {
            print_json(&record)?;
        } else {
            println!("Assignment {user_id}/{item_id} is now {}", record.status);
        }
        return Ok(());
    }

    let records = store.assignments_for_user(user_id)?;
    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No assignments for user {user_id}.");
        return Ok(());
    }
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.item_id.to_string(),
                r.status.to_string(),
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ITEM", "STATUS", "ASSIGNED AT"], rows);
    Ok(())
}
