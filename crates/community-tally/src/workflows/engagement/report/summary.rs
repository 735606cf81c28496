use super::super::calendar::{Calendar, TimeWindow};
use super::super::domain::{ActivityRecord, TaskCategory, UserId};
use super::super::repository::{ActivityLog, LogQuery, RepositoryError};
use super::super::scoring::ScoringEngine;
use super::views::{
    CategoryTallyEntry, EngagementReport, FlaggedEntry, ReportPeriod, UserActivityEntry,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Recomputes per-user standings from the log on every call.
pub struct ReportAggregator<L> {
    log: Arc<L>,
    calendar: Calendar,
    scoring: ScoringEngine,
}

impl<L> ReportAggregator<L>
where
    L: ActivityLog,
{
    pub fn new(log: Arc<L>, calendar: Calendar, scoring: ScoringEngine) -> Self {
        Self {
            log,
            calendar,
            scoring,
        }
    }

    pub fn window(&self, period: ReportPeriod) -> TimeWindow {
        match period {
            ReportPeriod::Day(date) => self.calendar.day_window(date),
            ReportPeriod::Week(date) => self.calendar.week_window(date),
        }
    }

    pub fn generate(
        &self,
        period: ReportPeriod,
        user_filter: Option<UserId>,
    ) -> Result<EngagementReport, RepositoryError> {
        let query = LogQuery::within(self.window(period)).for_user(user_filter);
        let records = self.log.scan(&query)?;
        Ok(summarize(period, user_filter, &records, &self.scoring))
    }
}

#[derive(Default)]
struct UserTally<'a> {
    links: BTreeMap<TaskCategory, Vec<&'a str>>,
}

/// Aggregate an already-filtered, log-ordered slice of records.
pub fn summarize(
    period: ReportPeriod,
    user_filter: Option<UserId>,
    records: &[ActivityRecord],
    scoring: &ScoringEngine,
) -> EngagementReport {
    let mut handles: HashMap<UserId, String> = HashMap::new();
    for record in records {
        let named = record
            .display_name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false);
        if named || !handles.contains_key(&record.user_id) {
            handles.insert(record.user_id, record.handle());
        }
    }
    let handle_of = |user_id: UserId| {
        handles
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    };

    let mut tallies: BTreeMap<UserId, UserTally<'_>> = BTreeMap::new();
    let mut flagged = Vec::new();

    for record in records {
        if record.is_valid() {
            tallies
                .entry(record.user_id)
                .or_default()
                .links
                .entry(record.category)
                .or_default()
                .push(record.proof_link.as_str());
        } else {
            flagged.push(FlaggedEntry {
                record_id: record.id,
                user_id: record.user_id,
                handle: handle_of(record.user_id),
                category: record.category,
                status: record.status,
                status_label: record.status.label(),
                reason: record.reason.clone(),
                proof_link: record.proof_link.clone(),
            });
        }
    }

    let mut users: Vec<UserActivityEntry> = tallies
        .into_iter()
        .map(|(user_id, tally)| {
            let categories: Vec<CategoryTallyEntry> = TaskCategory::ordered()
                .into_iter()
                .filter_map(|category| {
                    tally.links.get(&category).map(|links| {
                        let valid_count = u32::try_from(links.len()).unwrap_or(u32::MAX);
                        CategoryTallyEntry {
                            category,
                            category_label: category.label(),
                            report_tag: category.report_tag(),
                            valid_count,
                            points: scoring.points(category, valid_count),
                            increments: scoring.breakdown(category, valid_count),
                            proof_links: links.iter().map(|link| link.to_string()).collect(),
                        }
                    })
                })
                .collect();
            let total_points = categories.iter().map(|entry| entry.points).sum();

            UserActivityEntry {
                user_id,
                handle: handle_of(user_id),
                categories,
                total_points,
            }
        })
        .collect();

    users.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    EngagementReport {
        period,
        user_filter,
        users,
        flagged,
    }
}
