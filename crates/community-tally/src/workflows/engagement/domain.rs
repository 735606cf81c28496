use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat-platform identity of a program participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Trade,
    Analysis,
    Signal,
    Twitter,
}

impl TaskCategory {
    pub const fn ordered() -> [Self; 4] {
        [Self::Trade, Self::Analysis, Self::Signal, Self::Twitter]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Trade => "Trade",
            Self::Analysis => "Analysis",
            Self::Signal => "Signal",
            Self::Twitter => "Twitter",
        }
    }

    /// Tag used when the category is listed in a chat report.
    pub const fn report_tag(self) -> &'static str {
        match self {
            Self::Trade => "#trade",
            Self::Analysis => "#analysis",
            Self::Signal => "#signal",
            Self::Twitter => "X Post",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Valid,
    Invalid,
    Excess,
}

impl ActivityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::Excess => "Excess",
        }
    }

    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Final status rendered for a submission, together with its rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub status: ActivityStatus,
    pub reason: String,
}

impl Decision {
    pub fn valid() -> Self {
        Self {
            status: ActivityStatus::Valid,
            reason: String::new(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Invalid,
            reason: reason.into(),
        }
    }

    pub fn excess(reason: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Excess,
            reason: reason.into(),
        }
    }
}

/// A classified event waiting for its quota decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub category: TaskCategory,
    pub proof_link: String,
}

impl Submission {
    /// Stamp the submission with its decision and the instant it was admitted.
    pub fn into_activity(self, decision: Decision, created_at: DateTime<FixedOffset>) -> NewActivity {
        NewActivity {
            user_id: self.user_id,
            display_name: self.display_name,
            category: self.category,
            proof_link: self.proof_link,
            status: decision.status,
            reason: decision.reason,
            created_at,
        }
    }
}

/// Log entry before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub category: TaskCategory,
    pub proof_link: String,
    pub status: ActivityStatus,
    pub reason: String,
    pub created_at: DateTime<FixedOffset>,
}

impl NewActivity {
    pub fn with_id(self, id: u64) -> ActivityRecord {
        ActivityRecord {
            id,
            user_id: self.user_id,
            display_name: self.display_name,
            category: self.category,
            proof_link: self.proof_link,
            status: self.status,
            reason: self.reason,
            created_at: self.created_at,
        }
    }
}

/// Immutable row of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: u64,
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub category: TaskCategory,
    pub proof_link: String,
    pub status: ActivityStatus,
    pub reason: String,
    pub created_at: DateTime<FixedOffset>,
}

impl ActivityRecord {
    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    /// Name shown in reports: the chat username when known, the numeric id otherwise.
    pub fn handle(&self) -> String {
        match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.user_id.to_string(),
        }
    }
}
