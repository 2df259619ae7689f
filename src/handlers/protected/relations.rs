// handlers/protected/relations.rs - Favorite and shopping cart toggles

use axum::extract::State;

use crate::api::format::RecipeShortView;
use crate::api::ValidPath;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::toggle;
use crate::types::Collection;

async fn add(state: AppState, user: AuthUser, recipe_id: i64, collection: Collection) -> ApiResult<RecipeShortView> {
    let recipe = toggle::add_to_collection(state.store.as_ref(), collection, &user.0, recipe_id).await?;
    Ok(ApiResponse::created(RecipeShortView::new(&recipe, &state.config.media.url)))
}

async fn remove(state: AppState, user: AuthUser, recipe_id: i64, collection: Collection) -> ApiResult<()> {
    toggle::remove_from_collection(state.store.as_ref(), collection, &user.0, recipe_id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/recipes/:id/favorite
pub async fn add_favorite(State(state): State<AppState>, user: AuthUser, ValidPath(id): ValidPath<i64>) -> ApiResult<RecipeShortView> {
    add(state, user, id, Collection::Favorites).await
}

/// DELETE /api/recipes/:id/favorite
pub async fn remove_favorite(State(state): State<AppState>, user: AuthUser, ValidPath(id): ValidPath<i64>) -> ApiResult<()> {
    remove(state, user, id, Collection::Favorites).await
}

/// POST /api/recipes/:id/shopping_cart
pub async fn add_to_cart(State(state): State<AppState>, user: AuthUser, ValidPath(id): ValidPath<i64>) -> ApiResult<RecipeShortView> {
    add(state, user, id, Collection::ShoppingCart).await
}

/// DELETE /api/recipes/:id/shopping_cart
pub async fn remove_from_cart(State(state): State<AppState>, user: AuthUser, ValidPath(id): ValidPath<i64>) -> ApiResult<()> {
    remove(state, user, id, Collection::ShoppingCart).await
}
