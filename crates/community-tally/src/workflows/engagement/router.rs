use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::calendar::Clock;
use super::domain::UserId;
use super::export::write_csv;
use super::intake::ChatEvent;
use super::report::ReportPeriod;
use super::repository::ActivityLog;
use super::service::{EngagementService, SubmissionOutcome};

/// Header carrying the requester identity for admin-only endpoints.
pub const ADMIN_HEADER: &str = "x-admin-id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    #[default]
    Day,
    Week,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub period: PeriodKind,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub format: ReportFormat,
}

/// Router builder exposing event intake plus the admin report and export endpoints.
pub fn engagement_router<L, C>(service: Arc<EngagementService<L, C>>) -> Router
where
    L: ActivityLog + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/events", post(submit_handler::<L, C>))
        .route("/api/v1/reports", get(report_handler::<L, C>))
        .route("/api/v1/export", get(export_handler::<L, C>))
        .with_state(service)
}

pub(crate) async fn submit_handler<L, C>(
    State(service): State<Arc<EngagementService<L, C>>>,
    axum::Json(event): axum::Json<ChatEvent>,
) -> Response
where
    L: ActivityLog + 'static,
    C: Clock + 'static,
{
    match service.submit(event) {
        Ok(SubmissionOutcome::Recorded {
            record,
            acknowledgment,
        }) => {
            let payload = json!({
                "outcome": "recorded",
                "record_id": record.id,
                "category": record.category,
                "status": record.status,
                "reason": record.reason,
                "proof_link": record.proof_link,
                "acknowledgment": acknowledgment,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Ok(SubmissionOutcome::Ignored(reason)) => {
            let payload = json!({
                "outcome": "ignored",
                "reason": reason,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => internal_error(error.to_string()),
    }
}

pub(crate) async fn report_handler<L, C>(
    State(service): State<Arc<EngagementService<L, C>>>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Response
where
    L: ActivityLog + 'static,
    C: Clock + 'static,
{
    if let Err(rejection) = require_admin(&service, &headers) {
        return rejection;
    }

    let date = params.date.unwrap_or_else(|| service.today());
    let period = match params.period {
        PeriodKind::Day => ReportPeriod::Day(date),
        PeriodKind::Week => ReportPeriod::Week(date),
    };

    match service.report(period, params.user.map(UserId)) {
        Ok(report) => match params.format {
            ReportFormat::Json => (StatusCode::OK, axum::Json(report)).into_response(),
            ReportFormat::Text => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                report.render_text(),
            )
                .into_response(),
        },
        Err(error) => internal_error(error.to_string()),
    }
}

pub(crate) async fn export_handler<L, C>(
    State(service): State<Arc<EngagementService<L, C>>>,
    headers: HeaderMap,
) -> Response
where
    L: ActivityLog + 'static,
    C: Clock + 'static,
{
    if let Err(rejection) = require_admin(&service, &headers) {
        return rejection;
    }

    let rows = match service.export() {
        Ok(rows) => rows,
        Err(error) => return internal_error(error.to_string()),
    };

    let mut body = Vec::new();
    if let Err(error) = write_csv(&rows, &mut body) {
        return internal_error(error.to_string());
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response()
}

fn require_admin<L, C>(
    service: &EngagementService<L, C>,
    headers: &HeaderMap,
) -> Result<(), Response>
where
    L: ActivityLog + 'static,
    C: Clock + 'static,
{
    let requester = headers
        .get(ADMIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(UserId);

    match requester {
        Some(requester) if service.is_admin(requester) => Ok(()),
        _ => {
            warn!(requester = ?requester, "rejected admin request");
            let payload = json!({ "error": "admin identity required" });
            Err((StatusCode::FORBIDDEN, axum::Json(payload)).into_response())
        }
    }
}

fn internal_error(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
