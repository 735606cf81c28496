//! Community engagement tally: classify chat submissions, enforce per-category quotas, and
//! score the append-only activity log into per-user reports.

pub mod calendar;
pub mod classifier;
mod config;
pub mod domain;
pub mod export;
pub mod intake;
pub mod quota;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use calendar::{Calendar, Clock, FixedClock, SystemClock, TimeWindow};
pub use classifier::{classify, Classification, Verdict};
pub use config::EngagementConfig;
pub use domain::{
    ActivityRecord, ActivityStatus, Decision, NewActivity, Submission, TaskCategory, UserId,
};
pub use export::{ExportError, ExportRow};
pub use intake::{proof_link, AcknowledgmentPolicy, ChatEvent, ChatRef};
pub use quota::{QuotaEngine, QuotaPeriod, QuotaPolicy, QuotaRule};
pub use report::{EngagementReport, ReportAggregator, ReportPeriod};
pub use repository::{ActivityLog, InMemoryActivityLog, LogQuery, RepositoryError};
pub use router::engagement_router;
pub use scoring::{ScoringConfig, ScoringEngine, SlabTable, SlabTableError, SlabTier};
pub use service::{EngagementService, EngagementServiceError, IgnoreReason, SubmissionOutcome};
