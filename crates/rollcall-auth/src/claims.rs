//! JWT claim structure for access tokens.

use rollcall_models::{Role, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims embedded in an access token.
///
/// `role` records the role at issue time for clients; the server always
/// re-reads the role from storage when authenticating a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub role: Role,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// The subject as a typed ID, if it parses.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "user-id-123".to_string(),
            role: Role::Faculty,
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""role":"faculty""#));
    }

    #[test]
    fn test_user_id_parses_subject() {
        let id = UserId::new();
        let claims = Claims {
            sub: id.to_string(),
            role: Role::Student,
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), Some(id));
    }

    #[test]
    fn test_user_id_rejects_garbage_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            role: Role::Admin,
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
