use axum::{extract::Query, Json};

use crate::services::catalog::{self, JournalPrompt, PromptQuery, ResourceQuery, SupportResource};

pub async fn list_prompts(Query(query): Query<PromptQuery>) -> Json<Vec<&'static JournalPrompt>> {
    Json(catalog::prompts(query.category.as_deref()))
}

pub async fn list_resources(
    Query(query): Query<ResourceQuery>,
) -> Json<Vec<&'static SupportResource>> {
    Json(catalog::resources(&query))
}
