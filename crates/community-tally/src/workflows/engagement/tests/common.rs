use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::workflows::engagement::calendar::{Calendar, FixedClock, TimeWindow};
use crate::workflows::engagement::classifier::MISSING_SCREENSHOT;
use crate::workflows::engagement::domain::{
    ActivityRecord, ActivityStatus, NewActivity, TaskCategory, UserId,
};
use crate::workflows::engagement::intake::{ChatEvent, ChatRef};
use crate::workflows::engagement::quota::QuotaPeriod;
use crate::workflows::engagement::repository::{
    ActivityLog, InMemoryActivityLog, LogQuery, RepositoryError,
};
use crate::workflows::engagement::service::{EngagementService, SubmissionOutcome};
use crate::workflows::engagement::EngagementConfig;

pub(super) const ADMIN: UserId = UserId(1);
pub(super) const ALICE: i64 = 101;
pub(super) const BOB: i64 = 202;

pub(super) type MemoryService = EngagementService<InMemoryActivityLog, FixedClock>;

pub(super) fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn config() -> EngagementConfig {
    EngagementConfig {
        admin_id: Some(ADMIN),
        ..EngagementConfig::default()
    }
}

pub(super) struct Harness {
    pub(super) log: Arc<InMemoryActivityLog>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) service: Arc<MemoryService>,
}

impl Harness {
    pub(super) fn at(now: DateTime<Utc>) -> Self {
        Self::with_config(now, config())
    }

    pub(super) fn with_config(now: DateTime<Utc>, config: EngagementConfig) -> Self {
        let log = Arc::new(InMemoryActivityLog::default());
        let clock = Arc::new(FixedClock::new(now));
        let service = Arc::new(EngagementService::new(log.clone(), clock.clone(), config));
        Self {
            log,
            clock,
            service,
        }
    }

    /// Submit and return the recorded status, panicking when the event is ignored.
    pub(super) fn status_of(&self, event: ChatEvent) -> ActivityStatus {
        self.record_of(event).status
    }

    pub(super) fn record_of(&self, event: ChatEvent) -> ActivityRecord {
        match self.service.submit(event).expect("submission succeeds") {
            SubmissionOutcome::Recorded { record, .. } => record,
            other => panic!("expected recorded outcome, got {other:?}"),
        }
    }
}

pub(super) fn event(author: i64, text: &str, has_media: bool, message_id: i64) -> ChatEvent {
    ChatEvent {
        author_id: Some(author),
        display_name: Some(format!("user{author}")),
        text: Some(text.to_string()),
        caption: None,
        has_media,
        event_timestamp: instant(2025, 10, 15, 9, 0),
        chat_id: ChatRef::Numeric(-1_001_234_567_890),
        message_id,
    }
}

pub(super) fn named_event(author: i64, name: &str, text: &str, has_media: bool, message_id: i64) -> ChatEvent {
    ChatEvent {
        display_name: Some(name.to_string()),
        ..event(author, text, has_media, message_id)
    }
}

pub(super) fn trade(author: i64, message_id: i64) -> ChatEvent {
    event(author, "#trade closed long", true, message_id)
}

pub(super) fn analysis(author: i64, message_id: i64) -> ChatEvent {
    event(author, "#analysis BTC range", false, message_id)
}

pub(super) fn signal(author: i64, message_id: i64) -> ChatEvent {
    event(author, "#signal SOL entry 150 sl 140 target 180", false, message_id)
}

pub(super) fn tweet(author: i64, message_id: i64) -> ChatEvent {
    event(
        author,
        &format!("https://x.com/user{author}/status/{message_id}"),
        false,
        message_id,
    )
}

pub(super) fn utc_activity(user: i64, category: TaskCategory, status: ActivityStatus) -> NewActivity {
    let reason = match status {
        ActivityStatus::Valid => String::new(),
        ActivityStatus::Invalid => MISSING_SCREENSHOT.to_string(),
        ActivityStatus::Excess => QuotaPeriod::Daily.exceeded_reason().to_string(),
    };
    NewActivity {
        user_id: UserId(user),
        display_name: None,
        category,
        proof_link: "https://t.me/c/1/1".to_string(),
        status,
        reason,
        created_at: FixedOffset::east_opt(0)
            .expect("valid offset")
            .from_utc_datetime(&instant(2025, 10, 15, 9, 0).naive_utc()),
    }
}

pub(super) fn calendar() -> Calendar {
    Calendar::utc()
}

/// Log whose backing store is permanently down.
#[derive(Default)]
pub(super) struct UnavailableLog;

impl ActivityLog for UnavailableLog {
    fn append(&self, _activity: NewActivity) -> Result<ActivityRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn count_valid(
        &self,
        _user_id: UserId,
        _category: TaskCategory,
        _window: &TimeWindow,
    ) -> Result<u32, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn scan(&self, _query: &LogQuery) -> Result<Vec<ActivityRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}
