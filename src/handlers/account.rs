use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::db::account;
use crate::error::{AppError, AppResult};
use crate::models::account::{AccountErasure, DeleteAccountRequest, DELETE_CONFIRMATION};
use crate::services::realtime::{ChangeAction, ChangeTable};
use crate::AppState;

/// Erase every journal entry, metric and goal the user owns and mark the
/// account deleted. Safe to repeat.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<DeleteAccountRequest>,
) -> AppResult<Json<AccountErasure>> {
    if !body.is_confirmed() {
        return Err(AppError::Validation(format!(
            "Type {DELETE_CONFIRMATION} to confirm account deletion"
        )));
    }

    let erasure = account::erase(&state.db, auth_user.id, auth_user.email.as_deref())
        .await
        .map_err(|source| AppError::AccountDeletion {
            support_contact: state.config.support_contact.clone(),
            source,
        })?;

    state.analytics_cache.evict_user(auth_user.id).await;
    state
        .changes
        .publish(auth_user.id, ChangeTable::Accounts, ChangeAction::Delete)
        .await;

    tracing::info!(
        user_id = %auth_user.id,
        entries = erasure.entries_deleted,
        metrics = erasure.metrics_deleted,
        goals = erasure.goals_deleted,
        "Account data erased"
    );

    Ok(Json(erasure))
}
