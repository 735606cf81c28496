use super::super::calendar::Calendar;
use super::views::{EngagementReport, ReportPeriod};
use std::fmt::Write;

impl ReportPeriod {
    pub fn describe(self) -> String {
        match self {
            Self::Day(date) => date.to_string(),
            Self::Week(date) => format!("week of {}", Calendar::week_start(date)),
        }
    }
}

impl EngagementReport {
    /// Chat-formatted rendering used by the admin report command.
    pub fn render_text(&self) -> String {
        if self.is_empty() {
            return format!("No data for {}.", self.period.describe());
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "📊 **{}** ({})\n",
            self.period.heading(),
            self.period.describe()
        );

        for user in &self.users {
            let _ = writeln!(out, "👤 @{} | {} pts", user.handle, user.total_points);
            for entry in &user.categories {
                let _ = writeln!(
                    out,
                    "• {} ×{} → {} pts",
                    entry.report_tag, entry.valid_count, entry.points
                );
            }
            out.push('\n');
        }

        if !self.flagged.is_empty() {
            let _ = writeln!(out, "⚠️ **FLAGGED**");
            for entry in &self.flagged {
                let _ = writeln!(
                    out,
                    "• @{} {} [{}] {} {}",
                    entry.handle,
                    entry.category.report_tag(),
                    entry.status_label,
                    entry.reason,
                    entry.proof_link
                );
            }
        }

        out.trim_end().to_string()
    }
}
