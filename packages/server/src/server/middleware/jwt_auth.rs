use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::common::{Error, UserId};
use crate::domains::auth::JwtService;
use crate::domains::users::models::User;
use crate::server::app::AppState;

/// Authenticated identity from JWT
///
/// Only the id is trusted from the token; role and region are loaded fresh by
/// [`CurrentUser`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access).
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(user_id = %user.user_id, "Authenticated request");
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    // Get Authorization header
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    // Verify token
    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id(),
    })
}

/// The caller, reloaded from the store on every request.
///
/// Rejects with 401 when there is no valid token or the user no longer exists.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(Error::Unauthenticated)?;
        let state = parts
            .extensions
            .get::<AppState>()
            .cloned()
            .ok_or_else(|| Error::Internal("application state missing".to_string()))?;

        let user = state
            .deps
            .store
            .find_user(auth.user_id)
            .await?
            .ok_or(Error::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}
