use sqlx::PgPool;
use uuid::Uuid;

use crate::models::goal::{CreateGoalRequest, Goal};

pub async fn list(db: &PgPool, user_id: Uuid) -> Result<Vec<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        "SELECT * FROM wellness_goals WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn insert(db: &PgPool, user_id: Uuid, req: &CreateGoalRequest) -> Result<Goal, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO wellness_goals (id, user_id, title, description, target_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(req.title.trim())
    .bind(req.description.as_deref())
    .bind(req.target_date)
    .fetch_one(db)
    .await
}

/// `None` when the goal does not exist or belongs to someone else.
pub async fn set_completed(
    db: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    completed: bool,
) -> Result<Option<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        r#"
        UPDATE wellness_goals SET completed = $3
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(goal_id)
    .bind(user_id)
    .bind(completed)
    .fetch_optional(db)
    .await
}
