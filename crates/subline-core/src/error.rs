use thiserror::Error;

#[derive(Debug, Error)]
pub enum SublineError {
    #[error("at least one user required")]
    UsersRequired,

    #[error("from/to date required")]
    DateRangeRequired,

    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: String, to: String },

    #[error("invalid count: {0}")]
    InvalidCount(String),

    #[error("invalid segment {index}: {reason}")]
    InvalidSegment { index: usize, reason: String },

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid activity record: {0}")]
    InvalidActivity(String),

    #[error("no activities available for assignment")]
    NoActivitiesAvailable,

    #[error("no segments found")]
    NoSegments,

    #[error("segment not found: {0}")]
    SegmentNotFound(usize),

    #[error("assignment not found: user {user_id}, item {item_id}")]
    AssignmentNotFound { user_id: i64, item_id: i64 },

    #[error("activity {0} is already assigned")]
    AssignmentConflict(i64),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used at the HTTP and CLI boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
}

impl SublineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SublineError::UsersRequired
            | SublineError::DateRangeRequired
            | SublineError::InvalidDateRange { .. }
            | SublineError::InvalidCount(_)
            | SublineError::InvalidSegment { .. }
            | SublineError::InvalidStatus(_)
            | SublineError::InvalidActivity(_) => ErrorKind::Validation,
            SublineError::NoActivitiesAvailable
            | SublineError::NoSegments
            | SublineError::SegmentNotFound(_)
            | SublineError::AssignmentNotFound { .. } => ErrorKind::NotFound,
            SublineError::AssignmentConflict(_) => ErrorKind::Conflict,
            SublineError::Storage(_)
            | SublineError::Io(_)
            | SublineError::Yaml(_)
            | SublineError::Json(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, SublineError>;
