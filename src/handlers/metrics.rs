use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::metrics;
use crate::dto::{local_today, LocalTimeQuery};
use crate::error::{AppError, AppResult};
use crate::models::metric::{MetricsQuery, UpsertMetricRequest, WellnessMetric};
use crate::services::realtime::{ChangeAction, ChangeTable};
use crate::AppState;

const DEFAULT_RANGE_DAYS: i64 = 30;

pub async fn upsert_metrics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(local): Query<LocalTimeQuery>,
    Json(body): Json<UpsertMetricRequest>,
) -> AppResult<Json<WellnessMetric>> {
    body.validate()?;
    body.validate_sleep_step().map_err(AppError::Validation)?;

    let date = match body.date {
        Some(date) => date,
        None => local_today(Utc::now(), &local.offset()?),
    };

    let metric = metrics::upsert(&state.db, auth_user.id, date, &body)
        .await
        .map_err(|source| AppError::Save {
            what: "wellness metrics",
            source,
        })?;

    state
        .changes
        .publish(auth_user.id, ChangeTable::WellnessMetrics, ChangeAction::Update)
        .await;

    Ok(Json(metric))
}

pub async fn today_metrics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(local): Query<LocalTimeQuery>,
) -> AppResult<Json<Option<WellnessMetric>>> {
    let today = local_today(Utc::now(), &local.offset()?);

    let metric = metrics::fetch_for_date(&state.db, auth_user.id, today)
        .await
        .map_err(|source| AppError::Fetch {
            what: "wellness metrics",
            source,
        })?;

    Ok(Json(metric))
}

pub async fn list_metrics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MetricsQuery>,
    Query(local): Query<LocalTimeQuery>,
) -> AppResult<Json<Vec<WellnessMetric>>> {
    let today = local_today(Utc::now(), &local.offset()?);
    let end = query.end_date.unwrap_or(today);
    let start = query
        .start_date
        .unwrap_or(end - Duration::days(DEFAULT_RANGE_DAYS));

    if start > end {
        return Err(AppError::Validation("start_date must not be after end_date".into()));
    }

    let rows = metrics::fetch_range(&state.db, auth_user.id, start, end)
        .await
        .map_err(|source| AppError::Fetch {
            what: "wellness metrics",
            source,
        })?;

    Ok(Json(rows))
}
