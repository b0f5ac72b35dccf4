use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::goals;
use crate::error::{AppError, AppResult};
use crate::models::goal::{CreateGoalRequest, Goal, UpdateGoalRequest};
use crate::services::realtime::{ChangeAction, ChangeTable};
use crate::AppState;

pub async fn list_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Goal>>> {
    let goals = goals::list(&state.db, auth_user.id)
        .await
        .map_err(|source| AppError::Fetch {
            what: "goals",
            source,
        })?;

    Ok(Json(goals))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateGoalRequest>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    body.validate()?;
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be blank".into()));
    }

    let goal = goals::insert(&state.db, auth_user.id, &body)
        .await
        .map_err(|source| AppError::Save {
            what: "goal",
            source,
        })?;

    state
        .changes
        .publish(auth_user.id, ChangeTable::WellnessGoals, ChangeAction::Insert)
        .await;

    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<UpdateGoalRequest>,
) -> AppResult<Json<Goal>> {
    let goal = goals::set_completed(&state.db, auth_user.id, goal_id, body.completed)
        .await
        .map_err(|source| AppError::Save {
            what: "goal",
            source,
        })?
        .ok_or(AppError::NotFound("Goal not found".into()))?;

    state
        .changes
        .publish(auth_user.id, ChangeTable::WellnessGoals, ChangeAction::Update)
        .await;

    Ok(Json(goal))
}
