//! Access token issue and verification (HS256).
//!
//! ```ignore
//! use rollcall_auth::{create_access_token, verify_token};
//! use rollcall_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user.id, user.role, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use rollcall_config::JwtConfig;
use rollcall_core::AppError;
use rollcall_models::{Role, UserId};

use crate::claims::Claims;

/// Signs an access token for `user_id` valid for
/// `jwt_config.access_token_expiry` seconds.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_access_token(
    user_id: UserId,
    role: Role,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry and returns the claims.
///
/// # Errors
///
/// Returns `Unauthenticated` for malformed, expired or foreign tokens.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Not authorized, token failed"))
}
