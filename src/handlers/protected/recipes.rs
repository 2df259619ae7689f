// handlers/protected/recipes.rs - Recipe writes

use axum::extract::State;

use crate::api::format::RecipeView;
use crate::api::{loaders, ValidJson, ValidPath};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{RecipeComposer, RecipeInput};

/// POST /api/recipes
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(body): ValidJson<RecipeInput>,
) -> ApiResult<RecipeView> {
    let store = state.store.as_ref();
    let recipe = RecipeComposer::new(store, &state.media).create(&user, body).await?;

    let view = loaders::recipe_view(store, &state.config.media.url, Some(&user), &recipe).await?;
    Ok(ApiResponse::created(view))
}

/// PATCH /api/recipes/:id - full replace of ingredients and tags
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(body): ValidJson<RecipeInput>,
) -> ApiResult<RecipeView> {
    let store = state.store.as_ref();
    let recipe = RecipeComposer::new(store, &state.media).update(&user, id, body).await?;

    let view = loaders::recipe_view(store, &state.config.media.url, Some(&user), &recipe).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /api/recipes/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<()> {
    RecipeComposer::new(state.store.as_ref(), &state.media).delete(&user, id).await?;
    Ok(ApiResponse::no_content())
}
