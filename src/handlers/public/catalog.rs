// handlers/public/catalog.rs - Tags and ingredients (read only)

use axum::extract::State;

use crate::api::{QueryParams, ValidPath};
use crate::app::AppState;
use crate::database::models::{Ingredient, Tag};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    Ok(ApiResponse::success(state.store.list_tags().await?))
}

pub async fn get_tag(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<Tag> {
    let tag = state
        .store
        .tag_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tag {} not found", id)))?;
    Ok(ApiResponse::success(tag))
}

/// GET /api/ingredients?name=<prefix> - case-insensitive prefix search
pub async fn list_ingredients(State(state): State<AppState>, params: QueryParams) -> ApiResult<Vec<Ingredient>> {
    let prefix = params.get("name").map(str::trim).filter(|p| !p.is_empty());
    Ok(ApiResponse::success(state.store.search_ingredients(prefix).await?))
}

pub async fn get_ingredient(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<Ingredient> {
    let ingredient = state
        .store
        .ingredient_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Ingredient {} not found", id)))?;
    Ok(ApiResponse::success(ingredient))
}
