//! Persistent [`AssignmentStore`] backed by redb.
//!
//! # Table design
//!
//! ```text
//! items:        i64 item_id            -> JSON ActivityItem
//! assignments:  (i64 item_id, i64 user) -> JSON AssignmentRecord
//! ```
//!
//! Assignments are keyed item-first so "is this item assigned?" is a prefix
//! range scan. redb allows one write transaction at a time; the exclusion
//! check and the batch insert share that transaction, and a batch that fails
//! the check is dropped uncommitted.

use std::path::Path;

use redb::{Database, ReadTransaction, ReadableTable, TableDefinition};

use crate::error::{Result, SublineError};
use crate::store::{check_batch, sort_items, AssignmentStore};
use crate::types::{
    ActivityItem, ActivityStatus, AssignmentRecord, AssignmentStatus, DateRange, ItemId, UserId,
};

const ITEMS: TableDefinition<i64, &[u8]> = TableDefinition::new("items");
const ASSIGNMENTS: TableDefinition<(i64, i64), &[u8]> = TableDefinition::new("assignments");

fn storage(e: impl std::fmt::Display) -> SublineError {
    SublineError::Storage(e.to_string())
}

fn is_assigned<T>(table: &T, item_id: ItemId) -> Result<bool>
where
    T: ReadableTable<(i64, i64), &'static [u8]>,
{
    let mut range = table
        .range((item_id, UserId::MIN)..=(item_id, UserId::MAX))
        .map_err(storage)?;
    Ok(range.next().is_some())
}

pub struct DbStore {
    db: Database,
}

impl DbStore {
    /// Open or create the database at `path`, creating both tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(storage)?;
        let wt = db.begin_write().map_err(storage)?;
        wt.open_table(ITEMS).map_err(storage)?;
        wt.open_table(ASSIGNMENTS).map_err(storage)?;
        wt.commit().map_err(storage)?;
        tracing::debug!(path = %path.display(), "opened assignment database");
        Ok(Self { db })
    }

    fn read_items(
        rt: &ReadTransaction,
        keep: impl Fn(&ActivityItem) -> Result<bool>,
    ) -> Result<Vec<ActivityItem>> {
        let items = rt.open_table(ITEMS).map_err(storage)?;
        let mut result = Vec::new();
        for entry in items.iter().map_err(storage)? {
            let (_, v) = entry.map_err(storage)?;
            let item: ActivityItem = serde_json::from_slice(v.value())?;
            if keep(&item)? {
                result.push(item);
            }
        }
        sort_items(&mut result);
        Ok(result)
    }
}

impl AssignmentStore for DbStore {
    fn import_items(&self, items: &[ActivityItem]) -> Result<usize> {
        let wt = self.db.begin_write().map_err(storage)?;
        {
            let mut table = wt.open_table(ITEMS).map_err(storage)?;
            for item in items {
                let value = serde_json::to_vec(item)?;
                table.insert(item.id, value.as_slice()).map_err(storage)?;
            }
        }
        wt.commit().map_err(storage)?;
        tracing::info!(count = items.len(), "imported activities");
        Ok(items.len())
    }

    fn list_items(&self, range: Option<DateRange>) -> Result<Vec<ActivityItem>> {
        let rt = self.db.begin_read().map_err(storage)?;
        Self::read_items(&rt, |item| {
            Ok(range.map_or(true, |r| r.contains(item.scheduled_date)))
        })
    }

    fn find_unassigned_items(&self, range: DateRange) -> Result<Vec<ActivityItem>> {
        let rt = self.db.begin_read().map_err(storage)?;
        let assignments = rt.open_table(ASSIGNMENTS).map_err(storage)?;
        Self::read_items(&rt, |item| {
            Ok(range.contains(item.scheduled_date) && !is_assigned(&assignments, item.id)?)
        })
    }

    fn bulk_insert_assignments(&self, records: &[AssignmentRecord]) -> Result<()> {
        let wt = self.db.begin_write().map_err(storage)?;
        {
            let mut assignments = wt.open_table(ASSIGNMENTS).map_err(storage)?;
            check_batch(records, |id| is_assigned(&assignments, id))?;

            let mut items = wt.open_table(ITEMS).map_err(storage)?;
            for r in records {
                let value = serde_json::to_vec(r)?;
                assignments
                    .insert((r.item_id, r.user_id), value.as_slice())
                    .map_err(storage)?;

                let current = items
                    .get(r.item_id)
                    .map_err(storage)?
                    .map(|v| serde_json::from_slice::<ActivityItem>(v.value()))
                    .transpose()?;
                if let Some(mut item) = current {
                    if item.status == ActivityStatus::Pending {
                        item.status = ActivityStatus::Assigned;
                        let value = serde_json::to_vec(&item)?;
                        items.insert(item.id, value.as_slice()).map_err(storage)?;
                    }
                }
            }
        }
        wt.commit().map_err(storage)?;
        tracing::info!(records = records.len(), "committed assignment batch");
        Ok(())
    }

    fn assignments_for_user(&self, user_id: UserId) -> Result<Vec<AssignmentRecord>> {
        let rt = self.db.begin_read().map_err(storage)?;
        let table = rt.open_table(ASSIGNMENTS).map_err(storage)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(storage)? {
            let (k, v) = entry.map_err(storage)?;
            if k.value().1 != user_id {
                continue;
            }
            result.push(serde_json::from_slice(v.value())?);
        }
        Ok(result)
    }

    fn update_assignment_status(
        &self,
        user_id: UserId,
        item_id: ItemId,
        status: AssignmentStatus,
    ) -> Result<AssignmentRecord> {
        let wt = self.db.begin_write().map_err(storage)?;
        let record = {
            let mut assignments = wt.open_table(ASSIGNMENTS).map_err(storage)?;
            let existing = assignments
                .get((item_id, user_id))
                .map_err(storage)?
                .map(|v| serde_json::from_slice::<AssignmentRecord>(v.value()))
                .transpose()?;
            let mut record =
                existing.ok_or(SublineError::AssignmentNotFound { user_id, item_id })?;
            record.status = status;
            let value = serde_json::to_vec(&record)?;
            assignments
                .insert((item_id, user_id), value.as_slice())
                .map_err(storage)?;

            let mut items = wt.open_table(ITEMS).map_err(storage)?;
            let item = items
                .get(item_id)
                .map_err(storage)?
                .map(|v| serde_json::from_slice::<ActivityItem>(v.value()))
                .transpose()?;
            if let Some(mut item) = item {
                item.status = status.activity_status();
                let value = serde_json::to_vec(&item)?;
                items.insert(item_id, value.as_slice()).map_err(storage)?;
            }
            record
        };
        wt.commit().map_err(storage)?;
        Ok(record)
    }
}
