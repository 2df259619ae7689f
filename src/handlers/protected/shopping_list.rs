// handlers/protected/shopping_list.rs - GET /api/recipes/download_shopping_cart

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{build_shopping_list, SHOPPING_LIST_FILENAME};

/// Plain-text attachment with one line per ingredient; an empty cart is a 404
pub async fn download(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Response, ApiError> {
    let text = build_shopping_list(state.store.as_ref(), user.id).await?;

    let disposition = format!("attachment; filename=\"{}\"", SHOPPING_LIST_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        text,
    )
        .into_response())
}
