use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use rollcall_auth::{Caller, verify_token};
use rollcall_core::AppError;
use tracing::debug;

use crate::state::AppState;

/// The authenticated caller.
///
/// Verifies the bearer token, then reloads the account so role and class come
/// from storage rather than the token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Caller);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Not authorized, no token"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Not authorized, token failed"))?;

        let user = state.store.find_user(user_id).await?.ok_or_else(|| {
            debug!(%user_id, "Token references a deleted user");
            AppError::unauthorized("User not found")
        })?;

        Ok(AuthUser(Caller::from(&user)))
    }
}
