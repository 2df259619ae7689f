use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::app::AppState;
use crate::auth::validate_jwt;
use crate::database::models::User;
use crate::error::ApiError;

/// Who is making the request, resolved once per request by
/// [`resolve_requester`]
#[derive(Clone, Debug, Default)]
pub enum Requester {
    #[default]
    Anonymous,
    User(User),
}

impl Requester {
    pub fn user(&self) -> Option<&User> {
        match self {
            Requester::Anonymous => None,
            Requester::User(user) => Some(user),
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Requester {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Requester>().cloned().unwrap_or_default())
    }
}

/// Extractor for routes that need a signed-in user; anonymous requests are
/// rejected with 401
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Requester>() {
            Some(Requester::User(user)) => Ok(AuthUser(user.clone())),
            _ => Err(ApiError::unauthorized("Authentication credentials were not provided")),
        }
    }
}

/// Resolve the Authorization header into a [`Requester`]. Requests without
/// the header continue anonymously; a present but invalid token is a 401 on
/// every route.
pub async fn resolve_requester(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let requester = match extract_token_from_headers(request.headers()).map_err(ApiError::unauthorized)? {
        None => Requester::Anonymous,
        Some(token) => {
            let claims = validate_jwt(&token, &state.config.security.jwt_secret).map_err(|e| {
                warn!("Rejected auth token: {}", e);
                ApiError::from(e)
            })?;
            let user = state
                .store
                .user_by_id(claims.user_id)
                .await?
                .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
            debug!("Request authenticated as user {}", user.id);
            Requester::User(user)
        }
    };

    request.extensions_mut().insert(requester);
    Ok(next.run(request).await)
}

/// Accepts `Token <jwt>` and `Bearer <jwt>`
fn extract_token_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    let token = auth_str
        .strip_prefix("Token ")
        .or_else(|| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| "Authorization header must use Token or Bearer format".to_string())?;

    if token.trim().is_empty() {
        return Err("Empty auth token".to_string());
    }
    Ok(Some(token.trim().to_string()))
}
