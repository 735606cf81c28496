mod render;
mod summary;
pub mod views;

pub use summary::{summarize, ReportAggregator};
pub use views::{
    CategoryTallyEntry, EngagementReport, FlaggedEntry, ReportPeriod, UserActivityEntry,
};
