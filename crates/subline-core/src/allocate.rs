use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::{Result, SublineError};
use crate::types::{ActivityItem, AssignmentRecord, UserId};

/// Pair the first `requested` candidates with every user.
///
/// Candidates are taken in the order given; the caller has already narrowed
/// them to a date range and removed anything carrying an assignment. Records
/// come out user-major: (u1, i1), (u1, i2), ..., (u2, i1), ...
pub fn allocate(
    candidates: &[ActivityItem],
    user_ids: &[UserId],
    requested: usize,
    now: DateTime<Utc>,
) -> Result<Vec<AssignmentRecord>> {
    if user_ids.is_empty() {
        return Err(SublineError::UsersRequired);
    }
    if requested == 0 {
        return Err(SublineError::InvalidCount("count must be positive".into()));
    }
    if candidates.is_empty() {
        return Err(SublineError::NoActivitiesAvailable);
    }

    let mut seen = HashSet::new();
    let users: Vec<UserId> = user_ids
        .iter()
        .copied()
        .filter(|u| seen.insert(*u))
        .collect();
    let selected = &candidates[..requested.min(candidates.len())];

    let records = users
        .iter()
        .flat_map(|&user| {
            selected
                .iter()
                .map(move |item| AssignmentRecord::new(user, item.id, now))
        })
        .collect();
    Ok(records)
}

/// Interpret a raw `count` value from a request body.
///
/// Positive integers and strings holding one are accepted.
pub fn parse_count(raw: Option<&serde_json::Value>) -> Result<usize> {
    let invalid = |v: &dyn std::fmt::Display| SublineError::InvalidCount(v.to_string());
    let n = match raw {
        None | Some(serde_json::Value::Null) => return Err(invalid(&"missing")),
        Some(serde_json::Value::Number(n)) => n.as_u64().ok_or_else(|| invalid(n))?,
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid(s))?,
        Some(other) => return Err(invalid(other)),
    };
    if n == 0 {
        return Err(invalid(&n));
    }
    usize::try_from(n).map_err(|_| invalid(&n))
}
