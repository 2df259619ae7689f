// handlers/protected/users.rs - Current user, password and subscriptions

use axum::extract::State;
use serde::Deserialize;

use crate::api::format::{SubscriptionView, UserView};
use crate::api::{loaders, Page, QueryParams, ValidJson, ValidPath};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{toggle, users};

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// GET /api/users/me
pub async fn me(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<UserView> {
    Ok(ApiResponse::success(loaders::user_view(state.store.as_ref(), Some(&user), &user).await?))
}

/// POST /api/users/set_password
pub async fn set_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(body): ValidJson<SetPasswordRequest>,
) -> ApiResult<()> {
    users::change_password(state.store.as_ref(), &user, &body.current_password, &body.new_password).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/users/subscriptions - authors the user follows, newest follow first
pub async fn subscriptions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    params: QueryParams,
) -> ApiResult<Page<SubscriptionView>> {
    let store = state.store.as_ref();
    let pager = params.pager(&state.config.api);
    let recipes_limit = params.positive("recipes_limit");

    let (authors, count) = store.followed_authors(user.id, pager.request()).await?;
    let mut results = Vec::with_capacity(authors.len());
    for author in &authors {
        results.push(
            loaders::subscription_view(store, &state.config.media.url, Some(&user), author, recipes_limit).await?,
        );
    }
    Ok(ApiResponse::success(Page::new(results, count, pager, &params)))
}

/// POST /api/users/:id/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidPath(author_id): ValidPath<i64>,
    params: QueryParams,
) -> ApiResult<SubscriptionView> {
    let store = state.store.as_ref();
    let author = toggle::follow(store, &user, author_id).await?;

    let view = loaders::subscription_view(
        store,
        &state.config.media.url,
        Some(&user),
        &author,
        params.positive("recipes_limit"),
    )
    .await?;
    Ok(ApiResponse::created(view))
}

/// DELETE /api/users/:id/subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidPath(author_id): ValidPath<i64>,
) -> ApiResult<()> {
    toggle::unfollow(state.store.as_ref(), &user, author_id).await?;
    Ok(ApiResponse::no_content())
}
