use super::calendar::Calendar;
use super::domain::UserId;
use super::intake::AcknowledgmentPolicy;
use super::quota::QuotaPolicy;
use super::scoring::ScoringConfig;

/// Program rules for the engagement workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngagementConfig {
    pub admin_id: Option<UserId>,
    pub calendar: Calendar,
    pub quota: QuotaPolicy,
    pub scoring: ScoringConfig,
    pub acknowledgments: AcknowledgmentPolicy,
}
