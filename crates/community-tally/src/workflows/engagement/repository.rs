use std::sync::RwLock;

use chrono::{DateTime, FixedOffset};

use super::calendar::TimeWindow;
use super::domain::{ActivityRecord, ActivityStatus, NewActivity, TaskCategory, UserId};

/// Predicate for reading a slice of the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub window: Option<TimeWindow>,
    pub user_id: Option<UserId>,
}

impl LogQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn within(window: TimeWindow) -> Self {
        Self {
            window: Some(window),
            user_id: None,
        }
    }

    pub fn for_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn matches(&self, record: &ActivityRecord) -> bool {
        self.window
            .map(|window| window.contains(&record.created_at))
            .unwrap_or(true)
            && self
                .user_id
                .map(|user_id| record.user_id == user_id)
                .unwrap_or(true)
    }
}

/// Append-only storage for activity records.
pub trait ActivityLog: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    fn append(&self, activity: NewActivity) -> Result<ActivityRecord, RepositoryError>;
    /// Number of `Valid` records for the user and category inside `window`.
    fn count_valid(
        &self,
        user_id: UserId,
        category: TaskCategory,
        window: &TimeWindow,
    ) -> Result<u32, RepositoryError>;
    /// Matching records in insertion order.
    fn scan(&self, query: &LogQuery) -> Result<Vec<ActivityRecord>, RepositoryError>;
}

/// Error enumeration for log failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("activity log unavailable: {0}")]
    Unavailable(String),
    #[error("record {id} is out of order (previous id {previous})")]
    OutOfOrder { id: u64, previous: u64 },
    #[error("record {id} was created at {created_at}, before the previous record ({previous})")]
    TimestampRegression {
        id: u64,
        created_at: DateTime<FixedOffset>,
        previous: DateTime<FixedOffset>,
    },
}

/// Process-local log guarded by a read/write lock so report scans can share access.
#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    records: RwLock<Vec<ActivityRecord>>,
}

impl InMemoryActivityLog {
    /// Rebuild a log from previously exported records, which must be in ascending id order
    /// with non-decreasing `created_at`.
    pub fn from_records(records: Vec<ActivityRecord>) -> Result<Self, RepositoryError> {
        for pair in records.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.id <= previous.id {
                return Err(RepositoryError::OutOfOrder {
                    id: current.id,
                    previous: previous.id,
                });
            }
            if current.created_at < previous.created_at {
                return Err(RepositoryError::TimestampRegression {
                    id: current.id,
                    created_at: current.created_at,
                    previous: previous.created_at,
                });
            }
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("activity log lock poisoned".to_string())
}

impl ActivityLog for InMemoryActivityLog {
    fn append(&self, mut activity: NewActivity) -> Result<ActivityRecord, RepositoryError> {
        let mut guard = self.records.write().map_err(|_| poisoned())?;
        let (id, floor) = match guard.last() {
            Some(last) => (last.id + 1, Some(last.created_at)),
            None => (1, None),
        };
        // Keep created_at non-decreasing with id.
        if let Some(floor) = floor {
            if activity.created_at < floor {
                activity.created_at = floor.with_timezone(&activity.created_at.timezone());
            }
        }
        let record = activity.with_id(id);
        guard.push(record.clone());
        Ok(record)
    }

    fn count_valid(
        &self,
        user_id: UserId,
        category: TaskCategory,
        window: &TimeWindow,
    ) -> Result<u32, RepositoryError> {
        let guard = self.records.read().map_err(|_| poisoned())?;
        let count = guard
            .iter()
            .filter(|record| {
                record.status == ActivityStatus::Valid
                    && record.user_id == user_id
                    && record.category == category
                    && window.contains(&record.created_at)
            })
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn scan(&self, query: &LogQuery) -> Result<Vec<ActivityRecord>, RepositoryError> {
        let guard = self.records.read().map_err(|_| poisoned())?;
        Ok(guard
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}
