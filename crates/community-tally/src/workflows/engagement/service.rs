use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info};

use super::calendar::{Calendar, Clock};
use super::classifier::classify;
use super::config::EngagementConfig;
use super::domain::{ActivityRecord, Submission, UserId};
use super::export::ExportRow;
use super::intake::{AcknowledgmentPolicy, ChatEvent};
use super::quota::QuotaEngine;
use super::report::{EngagementReport, ReportAggregator, ReportPeriod};
use super::repository::{ActivityLog, LogQuery, RepositoryError};
use super::scoring::ScoringEngine;

/// Why an event produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    MissingAuthor,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Recorded {
        record: ActivityRecord,
        acknowledgment: Option<String>,
    },
    Ignored(IgnoreReason),
}

/// Service composing the classifier, quota engine, and report aggregator over one log.
pub struct EngagementService<L, C> {
    log: Arc<L>,
    clock: Arc<C>,
    calendar: Calendar,
    admin_id: Option<UserId>,
    acknowledgments: AcknowledgmentPolicy,
    quota: QuotaEngine<L>,
    reports: ReportAggregator<L>,
}

impl<L, C> EngagementService<L, C>
where
    L: ActivityLog + 'static,
    C: Clock + 'static,
{
    pub fn new(log: Arc<L>, clock: Arc<C>, config: EngagementConfig) -> Self {
        let EngagementConfig {
            admin_id,
            calendar,
            quota,
            scoring,
            acknowledgments,
        } = config;

        let quota = QuotaEngine::new(log.clone(), quota, calendar);
        let reports = ReportAggregator::new(log.clone(), calendar, ScoringEngine::new(scoring));

        Self {
            log,
            clock,
            calendar,
            admin_id,
            acknowledgments,
            quota,
            reports,
        }
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Civil date of "now" in the program's zone.
    pub fn today(&self) -> NaiveDate {
        self.calendar.civil_date(self.clock.now())
    }

    pub fn is_admin(&self, requester: UserId) -> bool {
        self.admin_id == Some(requester)
    }

    /// Classify an inbound event and record it with its final status.
    pub fn submit(&self, event: ChatEvent) -> Result<SubmissionOutcome, EngagementServiceError> {
        let Some(author_id) = event.author_id else {
            debug!(message_id = event.message_id, "ignoring event without author");
            return Ok(SubmissionOutcome::Ignored(IgnoreReason::MissingAuthor));
        };

        let Some(classification) = classify(event.body(), event.has_media) else {
            debug!(message_id = event.message_id, "event matched no task category");
            return Ok(SubmissionOutcome::Ignored(IgnoreReason::NoMatch));
        };

        let submission = Submission {
            user_id: UserId(author_id),
            display_name: event.display_name.clone(),
            category: classification.category,
            proof_link: event.proof_link(),
        };

        let record = self
            .quota
            .admit(submission, &classification.verdict, self.clock.as_ref())
            .inspect_err(|err| {
                error!(
                    user_id = author_id,
                    message_id = event.message_id,
                    error = %err,
                    "failed to record submission"
                );
            })?;

        info!(
            record_id = record.id,
            user_id = %record.user_id,
            category = record.category.label(),
            status = record.status.label(),
            sent_at = %event.event_timestamp,
            "submission recorded"
        );

        let acknowledgment = self.acknowledgments.render(&record);
        Ok(SubmissionOutcome::Recorded {
            record,
            acknowledgment,
        })
    }

    pub fn report(
        &self,
        period: ReportPeriod,
        user_filter: Option<UserId>,
    ) -> Result<EngagementReport, EngagementServiceError> {
        let report = self.reports.generate(period, user_filter)?;
        Ok(report)
    }

    /// Every log row in id order.
    pub fn export(&self) -> Result<Vec<ExportRow>, EngagementServiceError> {
        let records = self.log.scan(&LogQuery::all())?;
        Ok(records.iter().map(ExportRow::from).collect())
    }
}

/// Error raised by the engagement service.
#[derive(Debug, thiserror::Error)]
pub enum EngagementServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
