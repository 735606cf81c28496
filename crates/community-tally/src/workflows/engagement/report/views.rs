use super::super::domain::{ActivityStatus, TaskCategory, UserId};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum ReportPeriod {
    Day(NaiveDate),
    /// Monday-aligned week containing the date.
    Week(NaiveDate),
}

impl ReportPeriod {
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Day(_) => "DAILY EVENT REPORT",
            Self::Week(_) => "WEEKLY EVENT REPORT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTallyEntry {
    pub category: TaskCategory,
    pub category_label: &'static str,
    pub report_tag: &'static str,
    pub valid_count: u32,
    pub points: u32,
    /// Per-entry increments derived from the category curve; display only.
    pub increments: Vec<u32>,
    pub proof_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserActivityEntry {
    pub user_id: UserId,
    pub handle: String,
    pub categories: Vec<CategoryTallyEntry>,
    pub total_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedEntry {
    pub record_id: u64,
    pub user_id: UserId,
    pub handle: String,
    pub category: TaskCategory,
    pub status: ActivityStatus,
    pub status_label: &'static str,
    pub reason: String,
    pub proof_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngagementReport {
    pub period: ReportPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_filter: Option<UserId>,
    pub users: Vec<UserActivityEntry>,
    pub flagged: Vec<FlaggedEntry>,
}

impl EngagementReport {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.flagged.is_empty()
    }

    pub fn total_points(&self) -> u32 {
        self.users.iter().map(|user| user.total_points).sum()
    }

    pub fn user(&self, user_id: UserId) -> Option<&UserActivityEntry> {
        self.users.iter().find(|user| user.user_id == user_id)
    }
}

impl UserActivityEntry {
    pub fn category(&self, category: TaskCategory) -> Option<&CategoryTallyEntry> {
        self.categories
            .iter()
            .find(|entry| entry.category == category)
    }
}
