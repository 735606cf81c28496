use crate::infra::load_log_from_path;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use community_tally::config::AppConfig;
use community_tally::error::AppError;
use community_tally::workflows::engagement::{
    ActivityLog, ChatEvent, ChatRef, Clock, EngagementConfig, EngagementService, FixedClock,
    InMemoryActivityLog, LogQuery, ReportPeriod, SubmissionOutcome, SystemClock, UserId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// CSV export of the activity log
    #[arg(long)]
    pub(crate) log: PathBuf,
    /// Report date (YYYY-MM-DD). Defaults to today in the configured zone.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Report the Monday-aligned week containing the date instead of the single day
    #[arg(long)]
    pub(crate) week: bool,
    /// Restrict the report to one user id
    #[arg(long)]
    pub(crate) user: Option<i64>,
    /// Print the report as JSON instead of chat text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Day to simulate (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Reply to rejected submissions instead of staying silent
    #[arg(long)]
    pub(crate) announce_rejections: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        log,
        date,
        week,
        user,
        json,
    } = args;

    let config = AppConfig::load()?;
    let log = Arc::new(load_log_from_path(&log)?);
    let service = EngagementService::new(log, Arc::new(SystemClock), config.engagement);

    let date = date.unwrap_or_else(|| service.today());
    let period = if week {
        ReportPeriod::Week(date)
    } else {
        ReportPeriod::Day(date)
    };

    let report = service.report(period, user.map(UserId))?;
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        println!("{}", report.render_text());
    }

    Ok(())
}

struct DemoStep {
    author: i64,
    name: &'static str,
    text: &'static str,
    has_media: bool,
    hours_later: i64,
}

const ALICE: i64 = 5_001;
const BOB: i64 = 5_002;
const DEMO_CHAT: &str = "-1001987654321";

fn demo_script() -> Vec<DemoStep> {
    let step = |author, name, text, has_media, hours_later| DemoStep {
        author,
        name,
        text,
        has_media,
        hours_later,
    };
    vec![
        step(ALICE, "alice", "#trade BTC long closed +4%", true, 0),
        step(ALICE, "alice", "#trade ETH scalp", true, 1),
        step(ALICE, "alice", "#pnl forgot the screenshot", false, 1),
        step(ALICE, "alice", "#trade SOL swing", true, 2),
        step(ALICE, "alice", "#analysis BTC range 60k-64k", false, 2),
        step(ALICE, "alice", "#analysis second take", false, 3),
        step(BOB, "bob", "#signal ETH entry 2400 sl 2300", false, 3),
        step(BOB, "bob", "#signal ETH entry 2400 sl 2300 target 2700", false, 4),
        step(BOB, "bob", "#signal BNB entry 580 sl 560 target 640", false, 4),
        step(BOB, "bob", "#signal DOGE entry 0.2 sl 0.18 target 0.3", false, 5),
        step(BOB, "bob", "https://x.com/bob/status/1", false, 5),
        step(BOB, "bob", "gm everyone", false, 6),
        step(ALICE, "alice", "#trade final one", true, 7),
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        date,
        announce_rejections,
    } = args;

    let mut config = EngagementConfig::default();
    config.acknowledgments.announce_rejections = announce_rejections;

    let date = date.unwrap_or_else(|| config.calendar.civil_date(Utc::now()));
    let opening = date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(8);

    let log = Arc::new(InMemoryActivityLog::default());
    let clock = Arc::new(FixedClock::new(opening));
    let service = EngagementService::new(log.clone(), clock.clone(), config);

    println!("Community tally demo for {date}");
    println!("\nSubmissions");
    for (idx, step) in demo_script().into_iter().enumerate() {
        clock.set(opening + Duration::hours(step.hours_later));
        let event = ChatEvent {
            author_id: Some(step.author),
            display_name: Some(step.name.to_string()),
            text: Some(step.text.to_string()),
            caption: None,
            has_media: step.has_media,
            event_timestamp: clock.now(),
            chat_id: ChatRef::Text(DEMO_CHAT.to_string()),
            message_id: idx as i64 + 100,
        };

        match service.submit(event)? {
            SubmissionOutcome::Recorded {
                record,
                acknowledgment,
            } => {
                let reason = if record.reason.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", record.reason)
                };
                println!(
                    "- @{} \"{}\" -> {} {}{}",
                    step.name,
                    step.text,
                    record.category.label(),
                    record.status.label(),
                    reason
                );
                if let Some(reply) = acknowledgment {
                    println!("    bot: {reply}");
                }
            }
            SubmissionOutcome::Ignored(reason) => {
                println!("- @{} \"{}\" -> ignored ({:?})", step.name, step.text, reason);
            }
        }
    }

    let report = service.report(ReportPeriod::Day(date), None)?;
    println!("\n{}", report.render_text());

    let rows = log.scan(&LogQuery::all())?.len();
    println!("\nActivity log holds {rows} rows; totals above were recomputed from them.");

    Ok(())
}
