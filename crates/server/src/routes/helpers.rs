//! Shared route helpers for authentication.
//!
//! Admin routes carry `Authorization: Bearer <token>`. These helpers verify
//! the token, load the user (which must still be active), and enforce the
//! role the route requires.

use axum::http::HeaderMap;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Authenticate the request, or reject it with 401.
///
/// Returns the [`User`] the bearer token was issued for.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(AppError::Unauthorized("missing authentication token".into()));
    };

    let user_id = state.tokens().verify(token)?;

    let user = User::find_by_id(state.db(), user_id).await?;
    match user {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AppError::Unauthorized("invalid token".into())),
    }
}

/// Require an authenticated **admin** user.
pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let user = authenticate(state, headers).await?;
    if !user.is_admin() {
        return Err(AppError::Forbidden("admin role required".into()));
    }
    Ok(user)
}

/// Require an authenticated admin **or manager** user.
pub async fn require_manager(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let user = authenticate(state, headers).await?;
    if !user.is_manager() {
        return Err(AppError::Forbidden("manager role required".into()));
    }
    Ok(user)
}
