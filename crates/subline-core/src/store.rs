//! Storage collaborator for activities and assignments.
//!
//! [`AssignmentStore::bulk_insert_assignments`] is the write half of an
//! allocation. Implementations check the exclusion set and insert under the
//! same lock or transaction, so two concurrent allocations over the same pool
//! cannot both commit the same item.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, SublineError};
use crate::types::{
    ActivityItem, ActivityStatus, AssignmentRecord, AssignmentStatus, DateRange, ItemId, UserId,
};

pub trait AssignmentStore: Send + Sync {
    /// Insert or replace activities by id. Returns the number written.
    fn import_items(&self, items: &[ActivityItem]) -> Result<usize>;

    /// All activities, optionally restricted to `range`, ordered by date then id.
    fn list_items(&self, range: Option<DateRange>) -> Result<Vec<ActivityItem>>;

    /// Activities in `range` with no assignment record, ordered by date then id.
    fn find_unassigned_items(&self, range: DateRange) -> Result<Vec<ActivityItem>>;

    /// Commit every record or none of them.
    fn bulk_insert_assignments(&self, records: &[AssignmentRecord]) -> Result<()>;

    fn assignments_for_user(&self, user_id: UserId) -> Result<Vec<AssignmentRecord>>;

    fn update_assignment_status(
        &self,
        user_id: UserId,
        item_id: ItemId,
        status: AssignmentStatus,
    ) -> Result<AssignmentRecord>;
}

/// Reject a batch that repeats a (user, item) pair or touches an item that is
/// already assigned.
pub(crate) fn check_batch(
    records: &[AssignmentRecord],
    mut is_assigned: impl FnMut(ItemId) -> Result<bool>,
) -> Result<()> {
    let mut pairs = HashSet::new();
    for r in records {
        if !pairs.insert((r.user_id, r.item_id)) || is_assigned(r.item_id)? {
            return Err(SublineError::AssignmentConflict(r.item_id));
        }
    }
    Ok(())
}

pub(crate) fn sort_items(items: &mut [ActivityItem]) {
    items.sort_by(|a, b| {
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then(a.id.cmp(&b.id))
    });
}

// ---------------------------------------------------------------------------
// Import normalisation
// ---------------------------------------------------------------------------

/// One activity as it appears in an import file. Legacy exports spell the
/// fields several ways; they are folded into [`ActivityItem`] here.
#[derive(Debug, Deserialize)]
pub struct ImportRow {
    #[serde(alias = "Id", alias = "activityId", alias = "activity_id")]
    pub id: ItemId,
    #[serde(default, alias = "name", alias = "Title")]
    pub title: Option<String>,
    #[serde(
        rename = "scheduledDate",
        alias = "scheduled_date",
        alias = "ScheduledDate",
        alias = "date",
        alias = "Date"
    )]
    pub scheduled_date: String,
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
}

impl ImportRow {
    pub fn into_item(self) -> Result<ActivityItem> {
        let date = self.scheduled_date.trim();
        // Some exports carry a full timestamp; only the date part matters.
        let date = date.get(..10).unwrap_or(date);
        let scheduled_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            SublineError::InvalidActivity(format!(
                "activity {}: bad scheduled date '{}'",
                self.id, self.scheduled_date
            ))
        })?;
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => ActivityStatus::Pending,
            Some(s) => s.parse()?,
        };
        Ok(ActivityItem {
            id: self.id,
            title: self.title.unwrap_or_default(),
            scheduled_date,
            status,
        })
    }
}

/// Parse a JSON array of import rows.
pub fn parse_import(json: &str) -> Result<Vec<ActivityItem>> {
    let rows: Vec<ImportRow> = serde_json::from_str(json)?;
    rows.into_iter().map(ImportRow::into_item).collect()
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    items: BTreeMap<ItemId, ActivityItem>,
    assignments: BTreeMap<(ItemId, UserId), AssignmentRecord>,
}

impl Inner {
    fn is_assigned(&self, item_id: ItemId) -> bool {
        self.assignments
            .range((item_id, UserId::MIN)..=(item_id, UserId::MAX))
            .next()
            .is_some()
    }
}

/// In-process store guarded by a single mutex.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| SublineError::Storage("memory store lock poisoned".into()))
    }
}

impl AssignmentStore for MemoryStore {
    fn import_items(&self, items: &[ActivityItem]) -> Result<usize> {
        let mut inner = self.lock()?;
        for item in items {
            inner.items.insert(item.id, item.clone());
        }
        Ok(items.len())
    }

    fn list_items(&self, range: Option<DateRange>) -> Result<Vec<ActivityItem>> {
        let inner = self.lock()?;
        let mut items: Vec<ActivityItem> = inner
            .items
            .values()
            .filter(|i| range.map_or(true, |r| r.contains(i.scheduled_date)))
            .cloned()
            .collect();
        sort_items(&mut items);
        Ok(items)
    }

    fn find_unassigned_items(&self, range: DateRange) -> Result<Vec<ActivityItem>> {
        let inner = self.lock()?;
        let mut items: Vec<ActivityItem> = inner
            .items
            .values()
            .filter(|i| range.contains(i.scheduled_date) && !inner.is_assigned(i.id))
            .cloned()
            .collect();
        sort_items(&mut items);
        Ok(items)
    }

    fn bulk_insert_assignments(&self, records: &[AssignmentRecord]) -> Result<()> {
        let mut inner = self.lock()?;
        check_batch(records, |id| Ok(inner.is_assigned(id)))?;
        for r in records {
            inner.assignments.insert((r.item_id, r.user_id), r.clone());
            if let Some(item) = inner.items.get_mut(&r.item_id) {
                if item.status == ActivityStatus::Pending {
                    item.status = ActivityStatus::Assigned;
                }
            }
        }
        Ok(())
    }

    fn assignments_for_user(&self, user_id: UserId) -> Result<Vec<AssignmentRecord>> {
        let inner = self.lock()?;
        Ok(inner
            .assignments
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn update_assignment_status(
        &self,
        user_id: UserId,
        item_id: ItemId,
        status: AssignmentStatus,
    ) -> Result<AssignmentRecord> {
        let mut inner = self.lock()?;
        let record = inner
            .assignments
            .get_mut(&(item_id, user_id))
            .ok_or(SublineError::AssignmentNotFound { user_id, item_id })?;
        record.status = status;
        let updated = record.clone();
        if let Some(item) = inner.items.get_mut(&item_id) {
            item.status = status.activity_status();
        }
        Ok(updated)
    }
}
