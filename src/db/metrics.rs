use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::metric::{UpsertMetricRequest, WellnessMetric};

/// Insert or merge one day's metrics. Fields missing from `req` keep the
/// stored value, or the column default on the day's first save.
pub async fn upsert(
    db: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    req: &UpsertMetricRequest,
) -> Result<WellnessMetric, sqlx::Error> {
    sqlx::query_as::<_, WellnessMetric>(
        r#"
        INSERT INTO wellness_metrics
            (id, user_id, date, sleep_hours, exercise_minutes, water_glasses, energy_level, stress_level)
        VALUES ($1, $2, $3, COALESCE($4, 8), COALESCE($5, 30), COALESCE($6, 8), COALESCE($7, 5), COALESCE($8, 5))
        ON CONFLICT (user_id, date) DO UPDATE SET
            sleep_hours = COALESCE($4, wellness_metrics.sleep_hours),
            exercise_minutes = COALESCE($5, wellness_metrics.exercise_minutes),
            water_glasses = COALESCE($6, wellness_metrics.water_glasses),
            energy_level = COALESCE($7, wellness_metrics.energy_level),
            stress_level = COALESCE($8, wellness_metrics.stress_level),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .bind(req.sleep_hours)
    .bind(req.exercise_minutes)
    .bind(req.water_glasses)
    .bind(req.energy_level)
    .bind(req.stress_level)
    .fetch_one(db)
    .await
}

pub async fn fetch_for_date(
    db: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<WellnessMetric>, sqlx::Error> {
    sqlx::query_as::<_, WellnessMetric>(
        "SELECT * FROM wellness_metrics WHERE user_id = $1 AND date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(db)
    .await
}

/// Metrics between `start` and `end` inclusive, oldest first.
pub async fn fetch_range(
    db: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<WellnessMetric>, sqlx::Error> {
    sqlx::query_as::<_, WellnessMetric>(
        r#"
        SELECT * FROM wellness_metrics
        WHERE user_id = $1 AND date BETWEEN $2 AND $3
        ORDER BY date ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}
