use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bloom-api",
        "version": env!("CARGO_PKG_VERSION"),
        "sentiment_analysis": if state.sentiment.is_enabled() { "enabled" } else { "disabled" },
    }))
}

/// Ready once the database answers and the journal table exists.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let schema_ok = sqlx::query_scalar::<_, bool>(
        "SELECT to_regclass('public.journal_entries') IS NOT NULL",
    )
    .fetch_one(&state.db)
    .await;

    let (status, database) = match schema_ok {
        Ok(true) => (StatusCode::OK, "ok"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "migrations_pending"),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ready" } else { "not_ready" },
            "checks": { "database": database },
        })),
    )
}
