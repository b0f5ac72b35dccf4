use std::future::Future;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::db::{goals, journal, metrics};
use crate::dto::{local_today, ErrorBody, LocalTimeQuery};
use crate::error::{AppError, AppResult};
use crate::models::goal::GoalProgress;
use crate::services::analytics::{build_report, summarize_metrics, MetricsSummary};
use crate::services::realtime::{AnalyticsSnapshot, CacheKey};
use crate::AppState;

const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

impl AnalyticsQuery {
    fn window_days(&self, default: i64) -> AppResult<i64> {
        let days = self.days.unwrap_or(default);
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(AppError::Validation(format!(
                "days must be between 1 and {MAX_WINDOW_DAYS}"
            )));
        }
        Ok(days)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
    /// True when the refresh failed and this is the last good snapshot.
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub analytics: AnalyticsSnapshot,
    pub metrics: MetricsSummary,
    pub goals: GoalProgress,
}

fn cache_key(auth_user: &AuthUser, window_days: i64, offset: &FixedOffset) -> CacheKey {
    CacheKey {
        user_id: auth_user.id,
        window_days,
        tz_offset_minutes: offset.local_minus_utc() / 60,
    }
}

/// Store `snapshot` and return whichever snapshot is newest.
async fn settle(state: &AppState, key: CacheKey, snapshot: AnalyticsSnapshot) -> AnalyticsSnapshot {
    if state.analytics_cache.apply(key, snapshot.clone()).await {
        return snapshot;
    }
    tracing::debug!(user_id = %key.user_id, version = snapshot.version, "Newer analytics snapshot already cached");
    state.analytics_cache.get(&key).await.unwrap_or(snapshot)
}

/// First day of a `window_days`-long range of calendar days ending today.
fn metrics_window_start(today: NaiveDate, window_days: i64) -> NaiveDate {
    today - Duration::days(window_days - 1)
}

async fn fetching<T, F>(what: &'static str, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    fut.await.map_err(|source| AppError::Fetch { what, source })
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
    Query(local): Query<LocalTimeQuery>,
) -> AppResult<Json<AnalyticsResponse>> {
    let offset = local.offset()?;
    let window_days = query.window_days(state.config.analytics_window_days)?;
    let key = cache_key(&auth_user, window_days, &offset);

    // Read the version before fetching so a write that lands mid-fetch
    // leaves this snapshot older than the next one
    let version = state.changes.current_version(auth_user.id).await;
    let now = Utc::now();
    let since = now - Duration::days(window_days);

    let fetched = fetching(
        "analytics",
        journal::fetch_entries(&state.db, auth_user.id, Some(since), journal::Order::OldestFirst),
    )
    .await;

    let entries = match fetched {
        Ok(entries) => entries,
        Err(err) => {
            return match state.analytics_cache.get(&key).await {
                Some(snapshot) => {
                    tracing::warn!(
                        user_id = %auth_user.id,
                        version = snapshot.version,
                        "Serving stale analytics snapshot"
                    );
                    err.log();
                    Ok(Json(AnalyticsResponse {
                        snapshot,
                        stale: true,
                        error: Some(err.body()),
                    }))
                }
                None => Err(err),
            };
        }
    };

    let report = build_report(
        &entries,
        &state.rules,
        &offset,
        local_today(now, &offset),
        window_days,
    );
    let snapshot = settle(
        &state,
        key,
        AnalyticsSnapshot {
            version,
            computed_at: now,
            report,
        },
    )
    .await;

    Ok(Json(AnalyticsResponse {
        snapshot,
        stale: false,
        error: None,
    }))
}

/// Analytics, metrics summary and goal progress from three concurrent
/// reads. Any failed read fails the whole dashboard.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
    Query(local): Query<LocalTimeQuery>,
) -> AppResult<Json<DashboardResponse>> {
    let offset = local.offset()?;
    let window_days = query.window_days(state.config.analytics_window_days)?;
    let version = state.changes.current_version(auth_user.id).await;
    let now = Utc::now();
    let today = local_today(now, &offset);

    let (entries, metric_rows, goal_rows) = tokio::try_join!(
        fetching(
            "journal entries",
            journal::fetch_entries(
                &state.db,
                auth_user.id,
                Some(now - Duration::days(window_days)),
                journal::Order::OldestFirst,
            ),
        ),
        fetching(
            "wellness metrics",
            metrics::fetch_range(&state.db, auth_user.id, metrics_window_start(today, window_days), today),
        ),
        fetching("goals", goals::list(&state.db, auth_user.id)),
    )?;

    let report = build_report(&entries, &state.rules, &offset, today, window_days);
    let analytics = settle(
        &state,
        cache_key(&auth_user, window_days, &offset),
        AnalyticsSnapshot {
            version,
            computed_at: now,
            report,
        },
    )
    .await;

    Ok(Json(DashboardResponse {
        analytics,
        metrics: summarize_metrics(&metric_rows),
        goals: GoalProgress::from_goals(&goal_rows, today),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults_and_bounds() {
        assert_eq!(AnalyticsQuery::default().window_days(30).unwrap(), 30);
        assert_eq!(AnalyticsQuery { days: Some(365) }.window_days(30).unwrap(), 365);
        assert!(AnalyticsQuery { days: Some(366) }.window_days(30).is_err());
        assert!(AnalyticsQuery { days: Some(0) }.window_days(30).is_err());
    }

    #[test]
    fn test_metrics_window_covers_exactly_window_days() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        assert_eq!(metrics_window_start(today, 1), today);
        assert_eq!(
            metrics_window_start(today, 30),
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
        );
    }
}
