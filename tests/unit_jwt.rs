use rollcall_auth::{create_access_token, verify_token};
use rollcall_config::JwtConfig;
use rollcall_core::ErrorKind;
use rollcall_models::{Role, UserId};

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

#[test]
fn test_token_round_trip_for_every_role() {
    let jwt_config = get_test_jwt_config();

    for role in Role::ALL {
        let user_id = UserId::new();
        let token = create_access_token(user_id, role, &jwt_config).unwrap();
        let claims = verify_token(&token, &jwt_config).unwrap();

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.role, role);
        assert_eq!(claims.exp - claims.iat, 3600);
    }
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let token = create_access_token(UserId::new(), Role::Admin, &get_test_jwt_config()).unwrap();

    let other = JwtConfig {
        secret: "a_completely_different_secret".to_string(),
        ..get_test_jwt_config()
    };
    let err = verify_token(&token, &other).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthenticated);
}

#[test]
fn test_tampered_token_is_rejected() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(UserId::new(), Role::Student, &jwt_config).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    parts[2] = parts[2].chars().rev().collect();
    let tampered = parts.join(".");

    assert!(verify_token(&tampered, &jwt_config).is_err());
    assert!(verify_token("", &jwt_config).is_err());
}
