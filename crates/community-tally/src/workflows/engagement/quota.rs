use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::calendar::{Calendar, Clock, TimeWindow};
use super::classifier::Verdict;
use super::domain::{ActivityRecord, Decision, Submission, TaskCategory, UserId};
use super::repository::{ActivityLog, RepositoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPeriod {
    Daily,
    Weekly,
}

impl QuotaPeriod {
    pub const fn exceeded_reason(self) -> &'static str {
        match self {
            Self::Daily => "Daily Limit Reached",
            Self::Weekly => "Weekly Limit Reached",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRule {
    pub period: QuotaPeriod,
    pub limit: u32,
}

/// Per-category submission limits. Trade is unlimited; its slab curve flattens instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    pub analysis_daily_limit: u32,
    pub signal_daily_limit: u32,
    pub twitter_weekly_limit: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            analysis_daily_limit: 1,
            signal_daily_limit: 2,
            twitter_weekly_limit: 3,
        }
    }
}

impl QuotaPolicy {
    pub fn rule(&self, category: TaskCategory) -> Option<QuotaRule> {
        match category {
            TaskCategory::Trade => None,
            TaskCategory::Analysis => Some(QuotaRule {
                period: QuotaPeriod::Daily,
                limit: self.analysis_daily_limit,
            }),
            TaskCategory::Signal => Some(QuotaRule {
                period: QuotaPeriod::Daily,
                limit: self.signal_daily_limit,
            }),
            TaskCategory::Twitter => Some(QuotaRule {
                period: QuotaPeriod::Weekly,
                limit: self.twitter_weekly_limit,
            }),
        }
    }
}

type QuotaKey = (UserId, TaskCategory);

/// Per-key critical section. The guarded value is the UTC stamp of the key's most recent
/// admitted record, so a clock that steps backwards never reopens a closed window.
type KeyLock = Arc<Mutex<Option<DateTime<Utc>>>>;

/// Renders the Valid/Invalid/Excess decision and serializes count-then-append per user and category.
///
/// The lock map keeps one entry per (user, category) pair ever admitted and is never pruned,
/// so it is bounded by four entries per community member.
pub struct QuotaEngine<L> {
    log: Arc<L>,
    policy: QuotaPolicy,
    calendar: Calendar,
    locks: DashMap<QuotaKey, KeyLock>,
}

impl<L> QuotaEngine<L>
where
    L: ActivityLog,
{
    pub fn new(log: Arc<L>, policy: QuotaPolicy, calendar: Calendar) -> Self {
        Self {
            log,
            policy,
            calendar,
            locks: DashMap::new(),
        }
    }

    /// Quota rule and the window it applies to at `now`, or `None` for unlimited categories.
    pub fn window_for(
        &self,
        category: TaskCategory,
        now: DateTime<Utc>,
    ) -> Option<(QuotaRule, TimeWindow)> {
        let rule = self.policy.rule(category)?;
        let date = self.calendar.civil_date(now);
        let window = match rule.period {
            QuotaPeriod::Daily => self.calendar.day_window(date),
            QuotaPeriod::Weekly => self.calendar.week_window(date),
        };
        Some((rule, window))
    }

    /// Decide the status of a submission against the log as it stands.
    ///
    /// This reads the current count only; callers that go on to append must use [`Self::admit`]
    /// so the decision and the append happen under the same key lock.
    pub fn decide(
        &self,
        user_id: UserId,
        category: TaskCategory,
        verdict: &Verdict,
        now: DateTime<Utc>,
    ) -> Result<Decision, RepositoryError> {
        if let Verdict::Rejected(reason) = verdict {
            return Ok(Decision::invalid(*reason));
        }

        let Some((rule, window)) = self.window_for(category, now) else {
            return Ok(Decision::valid());
        };

        let count = self.log.count_valid(user_id, category, &window)?;
        if count >= rule.limit {
            Ok(Decision::excess(rule.period.exceeded_reason()))
        } else {
            Ok(Decision::valid())
        }
    }

    /// Decide and append as one atomic unit for the submission's (user, category) key.
    ///
    /// The clock is read only after the key lock is held, and never earlier than the key's
    /// previous record, so the window that was counted is the window the record lands in
    /// or an earlier one.
    pub fn admit<C>(
        &self,
        submission: Submission,
        verdict: &Verdict,
        clock: &C,
    ) -> Result<ActivityRecord, RepositoryError>
    where
        C: Clock + ?Sized,
    {
        if !verdict.is_accepted() {
            let now = clock.now();
            let decision = self.decide(submission.user_id, submission.category, verdict, now)?;
            let activity = submission.into_activity(decision, self.calendar.localize(now));
            return self.log.append(activity);
        }

        let lock = self.key_lock((submission.user_id, submission.category));
        let mut last_admitted = lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = match *last_admitted {
            Some(previous) => clock.now().max(previous),
            None => clock.now(),
        };

        let decision = self.decide(submission.user_id, submission.category, verdict, now)?;
        if !decision.status.is_valid() {
            warn!(
                user_id = %submission.user_id,
                category = submission.category.label(),
                reason = %decision.reason,
                "submission over quota"
            );
        }

        let activity = submission.into_activity(decision, self.calendar.localize(now));
        let record = self.log.append(activity)?;
        *last_admitted = Some(record.created_at.with_timezone(&Utc));
        Ok(record)
    }

    fn key_lock(&self, key: QuotaKey) -> KeyLock {
        self.locks.entry(key).or_default().value().clone()
    }

    #[cfg(test)]
    pub(crate) fn tracked_keys(&self) -> usize {
        self.locks.len()
    }
}
