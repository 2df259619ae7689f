// handlers/public/auth.rs - POST /api/auth/token/login

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ValidJson;
use crate::app::AppState;
use crate::auth::{generate_jwt, Claims};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::users;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Exchange email and password for a signed token
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let user = users::authenticate(state.store.as_ref(), &body.email, &body.password).await?;

    let claims = Claims::new(&user, state.config.security.jwt_expiry_hours);
    let auth_token = generate_jwt(&claims, &state.config.security.jwt_secret)?;

    info!("User {} logged in", user.id);
    Ok(ApiResponse::success(TokenResponse { auth_token }))
}
