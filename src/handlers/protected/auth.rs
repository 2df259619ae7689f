// handlers/protected/auth.rs - POST /api/auth/token/logout

use tracing::info;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Tokens are stateless, so logging out only confirms the token was valid
pub async fn logout(AuthUser(user): AuthUser) -> ApiResult<()> {
    info!("User {} logged out", user.id);
    Ok(ApiResponse::no_content())
}
