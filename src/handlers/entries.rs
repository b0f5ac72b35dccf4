use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::journal::{self, Order};
use crate::dto::LocalTimeQuery;
use crate::error::{AppError, AppResult};
use crate::models::entry::{CreateEntryRequest, EntryQuery, JournalEntry};
use crate::services::realtime::{ChangeAction, ChangeTable};
use crate::services::search::{search_entries, SearchQuery};
use crate::services::sentiment::SentimentAnalysis;
use crate::AppState;

/// Analyse, then store. Sentiment trouble never blocks the save; a failed
/// insert stores nothing and the client keeps its draft.
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<JournalEntry>)> {
    body.validate()?;
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Entry must not be blank".into()));
    }

    let analysis = state.sentiment.analyze(content).await;

    let entry = journal::insert_entry(
        &state.db,
        auth_user.id,
        content,
        body.mood_intensity,
        analysis.as_ref(),
    )
    .await
    .map_err(|source| AppError::Save {
        what: "journal entry",
        source,
    })?;

    state
        .changes
        .publish(auth_user.id, ChangeTable::JournalEntries, ChangeAction::Insert)
        .await;

    tracing::info!(
        user_id = %auth_user.id,
        entry_id = %entry.id,
        analyzed = analysis.is_some(),
        "Journal entry saved"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<EntryQuery>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let entries = journal::fetch_entries(&state.db, auth_user.id, query.since, Order::NewestFirst)
        .await
        .map_err(|source| AppError::Fetch {
            what: "journal entries",
            source,
        })?;

    Ok(Json(entries))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
    Query(local): Query<LocalTimeQuery>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let offset = local.offset()?;
    let now = Utc::now();

    // Narrow the fetch by the same bound the filter applies
    let since = query.range.lower_bound(now, &offset);
    let entries = journal::fetch_entries(&state.db, auth_user.id, since, Order::NewestFirst)
        .await
        .map_err(|source| AppError::Fetch {
            what: "journal entries",
            source,
        })?;

    Ok(Json(search_entries(entries, &query, now, &offset)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, max = 10000, message = "Text must be 1-10000 characters"))]
    pub content: String,
}

/// Ad-hoc analysis without saving. Always answers, falling back to the
/// neutral result when analysis is off or unavailable.
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Json<SentimentAnalysis>> {
    body.validate()?;
    tracing::debug!(user_id = %auth_user.id, "Ad-hoc sentiment analysis");

    let analysis = state
        .sentiment
        .analyze(body.content.trim())
        .await
        .unwrap_or_else(SentimentAnalysis::fallback);

    Ok(Json(analysis))
}
