// handlers/public/users.rs - Registration and user lookup

use axum::extract::State;

use crate::api::format::{RegisteredUser, UserView};
use crate::api::{loaders, Page, QueryParams, ValidJson, ValidPath};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::services::users::{self, Registration};

/// POST /api/users - create an account
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<Registration>,
) -> ApiResult<RegisteredUser> {
    let user = users::register(state.store.as_ref(), body).await?;
    Ok(ApiResponse::created(RegisteredUser::from(&user)))
}

/// GET /api/users - paginated, ordered by email
pub async fn list(
    State(state): State<AppState>,
    requester: Requester,
    params: QueryParams,
) -> ApiResult<Page<UserView>> {
    let store = state.store.as_ref();
    let pager = params.pager(&state.config.api);
    let (rows, count) = store.list_users(pager.request()).await?;

    let mut results = Vec::with_capacity(rows.len());
    for user in &rows {
        results.push(loaders::user_view(store, requester.user(), user).await?);
    }
    Ok(ApiResponse::success(Page::new(results, count, pager, &params)))
}

/// GET /api/users/:id
pub async fn detail(
    State(state): State<AppState>,
    requester: Requester,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<UserView> {
    let store = state.store.as_ref();
    let user = store
        .user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

    Ok(ApiResponse::success(loaders::user_view(store, requester.user(), &user).await?))
}
