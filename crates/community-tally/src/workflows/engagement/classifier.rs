use super::domain::TaskCategory;
use serde::Serialize;

pub const MISSING_SCREENSHOT: &str = "Missing Screenshot";
pub const MISSING_SIGNAL_FIELDS: &str = "Missing Entry/SL/Target";

const TRADE_TAGS: [&str; 2] = ["#trade", "#pnl"];
const ANALYSIS_TAG: &str = "#analysis";
const SIGNAL_TAG: &str = "#signal";
const SIGNAL_FIELDS: [&str; 3] = ["entry", "sl", "target"];
const TWITTER_HOSTS: [&str; 2] = ["x.com", "twitter.com"];

/// Structural verdict for a classified event, before any quota is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected(&'static str),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: TaskCategory,
    pub verdict: Verdict,
}

/// Map message text to a task category.
///
/// Matching is a case-insensitive substring search; the first rule that matches wins, in the
/// order Trade, Analysis, Signal, Twitter. Returns `None` when no rule matches.
pub fn classify(text: &str, has_media: bool) -> Option<Classification> {
    let text = text.to_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));

    if contains_any(&TRADE_TAGS) {
        let verdict = if has_media {
            Verdict::Accepted
        } else {
            Verdict::Rejected(MISSING_SCREENSHOT)
        };
        return Some(Classification {
            category: TaskCategory::Trade,
            verdict,
        });
    }

    if text.contains(ANALYSIS_TAG) {
        return Some(Classification {
            category: TaskCategory::Analysis,
            verdict: Verdict::Accepted,
        });
    }

    if text.contains(SIGNAL_TAG) {
        let verdict = if SIGNAL_FIELDS.iter().all(|field| text.contains(field)) {
            Verdict::Accepted
        } else {
            Verdict::Rejected(MISSING_SIGNAL_FIELDS)
        };
        return Some(Classification {
            category: TaskCategory::Signal,
            verdict,
        });
    }

    if contains_any(&TWITTER_HOSTS) {
        return Some(Classification {
            category: TaskCategory::Twitter,
            verdict: Verdict::Accepted,
        });
    }

    None
}
