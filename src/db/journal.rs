use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::entry::JournalEntry;
use crate::services::sentiment::SentimentAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    OldestFirst,
    NewestFirst,
}

/// One user's entries, optionally only those created at or after `since`.
pub async fn fetch_entries(
    db: &PgPool,
    user_id: Uuid,
    since: Option<DateTime<Utc>>,
    order: Order,
) -> Result<Vec<JournalEntry>, sqlx::Error> {
    let sql = match order {
        Order::OldestFirst => {
            r#"
            SELECT * FROM journal_entries
            WHERE user_id = $1 AND ($2::timestamptz IS NULL OR created_at >= $2)
            ORDER BY created_at ASC
            "#
        }
        Order::NewestFirst => {
            r#"
            SELECT * FROM journal_entries
            WHERE user_id = $1 AND ($2::timestamptz IS NULL OR created_at >= $2)
            ORDER BY created_at DESC
            "#
        }
    };

    sqlx::query_as::<_, JournalEntry>(sql)
        .bind(user_id)
        .bind(since)
        .fetch_all(db)
        .await
}

pub async fn insert_entry(
    db: &PgPool,
    user_id: Uuid,
    content: &str,
    mood_intensity: Option<i32>,
    analysis: Option<&SentimentAnalysis>,
) -> Result<JournalEntry, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries
            (id, user_id, content, sentiment_score, sentiment_label, ai_feedback, mood_intensity)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(content)
    .bind(analysis.map(|a| a.sentiment_score))
    .bind(analysis.map(|a| a.sentiment_label))
    .bind(analysis.map(|a| a.feedback.as_str()))
    .bind(mood_intensity)
    .fetch_one(db)
    .await
}
