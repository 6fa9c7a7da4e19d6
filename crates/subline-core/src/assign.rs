//! Allocation request handling: validate, read the unassigned pool, allocate,
//! and commit the batch through the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::allocate::{allocate, parse_count};
use crate::error::{Result, SublineError};
use crate::store::AssignmentStore;
use crate::types::{DateRange, ItemId, UserId};

/// A validated allocation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRequest {
    pub user_ids: Vec<UserId>,
    pub range: DateRange,
    pub count: usize,
}

impl AssignRequest {
    pub fn new(user_ids: Vec<UserId>, range: DateRange, count: usize) -> Result<Self> {
        if user_ids.is_empty() {
            return Err(SublineError::UsersRequired);
        }
        if count == 0 {
            return Err(SublineError::InvalidCount("count must be positive".into()));
        }
        Ok(Self {
            user_ids,
            range,
            count,
        })
    }

    /// Validate raw request fields in the order a client should see failures:
    /// users, then dates, then count.
    pub fn from_raw(
        user_ids: Option<Vec<UserId>>,
        from_date: Option<&str>,
        to_date: Option<&str>,
        count: Option<&serde_json::Value>,
        max_count: usize,
    ) -> Result<Self> {
        let user_ids = user_ids
            .filter(|u| !u.is_empty())
            .ok_or(SublineError::UsersRequired)?;
        let range = DateRange::parse(from_date, to_date)?;
        let count = parse_count(count)?;
        if count > max_count {
            return Err(SublineError::InvalidCount(format!(
                "{count} exceeds the limit of {max_count}"
            )));
        }
        Self::new(user_ids, range, count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOutcome {
    pub success: bool,
    pub assigned: usize,
    pub message: String,
}

/// Run one allocation against `store`.
///
/// Either the whole batch is committed or the store's error is returned and
/// nothing is assigned.
pub fn assign(
    store: &dyn AssignmentStore,
    request: &AssignRequest,
    now: DateTime<Utc>,
) -> Result<AssignOutcome> {
    let candidates = store.find_unassigned_items(request.range)?;
    let records = allocate(&candidates, &request.user_ids, request.count, now)?;
    let items: HashSet<ItemId> = records.iter().map(|r| r.item_id).collect();
    let users: HashSet<UserId> = records.iter().map(|r| r.user_id).collect();

    if let Err(e) = store.bulk_insert_assignments(&records) {
        tracing::warn!(error = %e, "assignment batch rejected");
        return Err(e);
    }

    tracing::info!(
        users = users.len(),
        records = records.len(),
        from = %request.range.from,
        to = %request.range.to,
        "assigned activities"
    );

    Ok(AssignOutcome {
        success: true,
        assigned: records.len(),
        message: format!(
            "assigned {} activities to {} users",
            items.len(),
            users.len()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{ActivityItem, AssignmentRecord};
    use chrono::NaiveDate;
    use serde_json::json;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store_with(ids: &[ItemId]) -> MemoryStore {
        let store = MemoryStore::new();
        let items: Vec<ActivityItem> = ids
            .iter()
            .map(|&id| ActivityItem::new(id, format!("a{id}"), d("2024-09-10")))
            .collect();
        store.import_items(&items).unwrap();
        store
    }

    fn september() -> DateRange {
        DateRange::new(d("2024-09-01"), d("2024-09-30")).unwrap()
    }

    #[test]
    fn assigns_first_items_to_every_user() {
        let store = store_with(&[1, 2, 3]);
        let req = AssignRequest::new(vec![1, 2], september(), 2).unwrap();
        let outcome = assign(&store, &req, Utc::now()).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.assigned, 4);
        assert_eq!(outcome.message, "assigned 2 activities to 2 users");
        let ids: Vec<ItemId> = store
            .find_unassigned_items(september())
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn second_run_draws_from_what_is_left() {
        let store = store_with(&[1, 2, 3]);
        let req = AssignRequest::new(vec![9], september(), 2).unwrap();
        assign(&store, &req, Utc::now()).unwrap();
        let outcome = assign(&store, &req, Utc::now()).unwrap();
        assert_eq!(outcome.assigned, 1);

        let err = assign(&store, &req, Utc::now()).unwrap_err();
        assert!(matches!(err, SublineError::NoActivitiesAvailable));
    }

    #[test]
    fn empty_pool_is_reported_not_returned_as_success() {
        let store = store_with(&[]);
        let req = AssignRequest::new(vec![1], september(), 3).unwrap();
        assert!(matches!(
            assign(&store, &req, Utc::now()),
            Err(SublineError::NoActivitiesAvailable)
        ));
    }

    struct FailingStore(MemoryStore);

    impl AssignmentStore for FailingStore {
        fn import_items(&self, items: &[ActivityItem]) -> Result<usize> {
            self.0.import_items(items)
        }
        fn list_items(&self, range: Option<DateRange>) -> Result<Vec<ActivityItem>> {
            self.0.list_items(range)
        }
        fn find_unassigned_items(&self, range: DateRange) -> Result<Vec<ActivityItem>> {
            self.0.find_unassigned_items(range)
        }
        fn bulk_insert_assignments(&self, _records: &[AssignmentRecord]) -> Result<()> {
            Err(SublineError::Storage("write failed".into()))
        }
        fn assignments_for_user(&self, user_id: UserId) -> Result<Vec<AssignmentRecord>> {
            self.0.assignments_for_user(user_id)
        }
        fn update_assignment_status(
            &self,
            user_id: UserId,
            item_id: ItemId,
            status: crate::types::AssignmentStatus,
        ) -> Result<AssignmentRecord> {
            self.0.update_assignment_status(user_id, item_id, status)
        }
    }

    #[test]
    fn storage_failure_propagates_and_assigns_nothing() {
        let store = FailingStore(store_with(&[1, 2]));
        let req = AssignRequest::new(vec![1], september(), 2).unwrap();
        let err = assign(&store, &req, Utc::now()).unwrap_err();
        assert!(matches!(err, SublineError::Storage(_)));
        assert!(store.assignments_for_user(1).unwrap().is_empty());
        assert_eq!(store.find_unassigned_items(september()).unwrap().len(), 2);
    }

    #[test]
    fn from_raw_reports_the_first_problem() {
        let count = json!(2);
        assert!(matches!(
            AssignRequest::from_raw(Some(vec![]), Some("2024-01-01"), Some("2024-01-02"), Some(&count), 10),
            Err(SublineError::UsersRequired)
        ));
        assert!(matches!(
            AssignRequest::from_raw(Some(vec![1]), None, Some("2024-01-02"), Some(&count), 10),
            Err(SublineError::DateRangeRequired)
        ));
        assert!(matches!(
            AssignRequest::from_raw(Some(vec![1]), Some("2024-01-01"), Some("2024-01-02"), Some(&json!("x")), 10),
            Err(SublineError::InvalidCount(_))
        ));
        assert!(matches!(
            AssignRequest::from_raw(Some(vec![1]), Some("2024-01-01"), Some("2024-01-02"), Some(&json!(11)), 10),
            Err(SublineError::InvalidCount(_))
        ));
        let req = AssignRequest::from_raw(
            Some(vec![1, 2]),
            Some("2024-01-01"),
            Some("2024-01-02"),
            Some(&json!("3")),
            10,
        )
        .unwrap();
        assert_eq!(req.count, 3);
    }
}
