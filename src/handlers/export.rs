use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{NaiveDate, Utc};

use crate::auth::middleware::AuthUser;
use crate::db::{goals, journal, metrics};
use crate::dto::LocalTimeQuery;
use crate::error::{AppError, AppResult};
use crate::services::export::{render, ExportData, ExportFormat, ExportQuery};
use crate::AppState;

pub async fn export_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let offset = LocalTimeQuery {
        tz_offset_minutes: query.tz_offset_minutes,
    }
    .offset()?;
    let now = Utc::now();
    let since = query.range.lower_bound(now);

    let entries = journal::fetch_entries(&state.db, auth_user.id, since, journal::Order::NewestFirst)
        .await
        .map_err(|source| AppError::Fetch {
            what: "journal entries",
            source,
        })?;

    if entries.is_empty() {
        return Err(AppError::NothingToExport(format!(
            "No entries found for the selected time period ({}).",
            query.range.as_str()
        )));
    }

    // The archive carries metrics and goals for the same period
    let (metric_rows, goal_rows) = match query.format {
        ExportFormat::Json => {
            let start = since.map_or(NaiveDate::default(), |s| s.with_timezone(&offset).date_naive());
            let end = now.with_timezone(&offset).date_naive();
            tokio::try_join!(
                metrics::fetch_range(&state.db, auth_user.id, start, end),
                goals::list(&state.db, auth_user.id),
            )
            .map_err(|source| AppError::Fetch {
                what: "export data",
                source,
            })?
        }
        _ => (Vec::new(), Vec::new()),
    };

    let file = render(
        &ExportData {
            entries: &entries,
            metrics: &metric_rows,
            goals: &goal_rows,
            range: query.range,
            generated_at: now,
            offset,
        },
        query.format,
    )?;

    tracing::info!(
        user_id = %auth_user.id,
        entries = entries.len(),
        filename = %file.filename,
        "Journal exported"
    );

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid export filename: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
