use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SublineError;

pub type UserId = i64;
pub type ItemId = i64;

// ---------------------------------------------------------------------------
// ActivityStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Pending,
    Assigned,
    Working,
    Completed,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::Assigned => "assigned",
            ActivityStatus::Working => "working",
            ActivityStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityStatus {
    type Err = SublineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ActivityStatus::Pending),
            "assigned" => Ok(ActivityStatus::Assigned),
            "working" => Ok(ActivityStatus::Working),
            "completed" => Ok(ActivityStatus::Completed),
            _ => Err(SublineError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AssignmentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Assigned,
    Working,
    Completed,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Working => "working",
            AssignmentStatus::Completed => "completed",
        }
    }

    /// Status the owning activity takes on when an assignment reaches `self`.
    pub fn activity_status(self) -> ActivityStatus {
        match self {
            AssignmentStatus::Assigned => ActivityStatus::Assigned,
            AssignmentStatus::Working => ActivityStatus::Working,
            AssignmentStatus::Completed => ActivityStatus::Completed,
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = SublineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assigned" => Ok(AssignmentStatus::Assigned),
            "working" => Ok(AssignmentStatus::Working),
            "completed" => Ok(AssignmentStatus::Completed),
            _ => Err(SublineError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ActivityItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub status: ActivityStatus,
}

impl ActivityItem {
    pub fn new(id: ItemId, title: impl Into<String>, scheduled_date: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            scheduled_date,
            status: ActivityStatus::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// AssignmentRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}

impl AssignmentRecord {
    pub fn new(user_id: UserId, item_id: ItemId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            item_id,
            status: AssignmentStatus::Assigned,
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Inclusive range of scheduled dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> crate::Result<Self> {
        if from > to {
            return Err(SublineError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// Parse `YYYY-MM-DD` bounds. Missing or unparseable bounds are reported
    /// as a missing range.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> crate::Result<Self> {
        let parse = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        };
        match (parse(from), parse(to)) {
            (Some(from), Some(to)) => Self::new(from, to),
            _ => Err(SublineError::DateRangeRequired),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
