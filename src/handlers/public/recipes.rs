// handlers/public/recipes.rs - Recipe listing and detail

use axum::extract::State;

use crate::api::format::RecipeView;
use crate::api::{loaders, Page, QueryParams, ValidPath};
use crate::app::AppState;
use crate::database::RecipeFilter;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Requester};

/// Build the listing filter. The favorite and cart filters only apply to a
/// signed-in requester.
pub fn recipe_filter(params: &QueryParams, requester: &Requester) -> RecipeFilter {
    let viewer = requester.user().map(|u| u.id);
    RecipeFilter {
        author_id: params.positive("author"),
        tag_slugs: params.get_all("tags").into_iter().map(str::to_string).collect(),
        favorited_by: viewer.filter(|_| params.flag("is_favorited")),
        in_cart_of: viewer.filter(|_| params.flag("is_in_shopping_cart")),
    }
}

/// GET /api/recipes - newest first
pub async fn list(
    State(state): State<AppState>,
    requester: Requester,
    params: QueryParams,
) -> ApiResult<Page<RecipeView>> {
    let store = state.store.as_ref();
    let pager = params.pager(&state.config.api);
    let filter = recipe_filter(&params, &requester);

    let (rows, count) = store.list_recipes(&filter, pager.request()).await?;
    let results = loaders::recipe_views(store, &state.config.media.url, requester.user(), &rows).await?;

    Ok(ApiResponse::success(Page::new(results, count, pager, &params)))
}

/// GET /api/recipes/:id
pub async fn detail(
    State(state): State<AppState>,
    requester: Requester,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<RecipeView> {
    let store = state.store.as_ref();
    let recipe = store
        .recipe_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Recipe {} not found", id)))?;

    let view = loaders::recipe_view(store, &state.config.media.url, requester.user(), &recipe).await?;
    Ok(ApiResponse::success(view))
}
