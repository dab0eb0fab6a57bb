//! User domain models and DTOs.
//!
//! Accounts are created by an administrator (or the one-time bootstrap) and
//! carry a [`Role`], an institutional [`UniqueId`] whose prefix matches that
//! role, and an optional class reference for students and faculty.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::classes::Class;
use crate::ids::{ClassId, UserId};
use crate::value_types::UniqueId;

/// The three account roles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Faculty, Role::Student];

    /// Prefix every [`UniqueId`] of this role must start with.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Role::Admin => "ADM",
            Role::Faculty => "FAC",
            Role::Student => "STU",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }

    /// Only students and faculty belong to a class.
    pub fn has_class(self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "faculty" => Ok(Role::Faculty),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A stored user account, including credential material. Never serialized
/// directly; responses go through [`UserResponse`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub unique_id: UniqueId,
    pub role: Role,
    pub class_id: Option<ClassId>,
    pub password_hash: String,
    pub reset_code: Option<String>,
    pub reset_code_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub unique_id: UniqueId,
    pub role: Role,
    pub class_id: Option<ClassId>,
    pub password_hash: String,
}

/// A partial update. `class_id: Some(None)` clears the class reference.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub class_id: Option<Option<ClassId>>,
}

/// Public view of a user with the class reference resolved.
///
/// A class that no longer exists resolves to `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub unique_id: UniqueId,
    pub role: Role,
    pub class: Option<Class>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: User, class: Option<Class>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            unique_id: user.unique_id,
            role: user.role,
            class,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for registering a user (admin only, or the bootstrap admin).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "asha@college.edu")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub unique_id: UniqueId,
    pub role: Role,
    #[serde(default, alias = "class")]
    pub class_id: Option<ClassId>,
}

/// DTO for an administrator editing a user. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    #[serde(default, alias = "class")]
    pub class_id: Option<ClassId>,
}

/// Login with institutional ID and password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Unique ID is required"))]
    #[schema(example = "STU001")]
    pub unique_id: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendCodeRequest {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "asha@college.edu")]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(equal = 6, message = "Verification code must be 6 digits"))]
    #[schema(example = "482913")]
    pub code: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Faculty).unwrap(), r#""faculty""#);
        let role: Role = serde_json::from_str(r#""student""#).unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert!(serde_json::from_str::<Role>(r#""principal""#).is_err());
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_admin_has_no_class() {
        assert!(!Role::Admin.has_class());
        assert!(Role::Faculty.has_class());
        assert!(Role::Student.has_class());
    }

    #[test]
    fn test_register_dto_accepts_class_alias() {
        let class_id = ClassId::new();
        let json = format!(
            r#"{{"name":"A","email":"a@b.edu","password":"secret1","uniqueId":"STU001","role":"student","class":"{}"}}"#,
            class_id
        );
        let dto: RegisterUserDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.class_id, Some(class_id));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_register_dto_validation() {
        let json = r#"{"name":"","email":"nope","password":"123","uniqueId":"STU001","role":"student"}"#;
        let dto: RegisterUserDto = serde_json::from_str(json).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_user_response_is_camel_case() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: "Asha".into(),
            email: "asha@college.edu".into(),
            unique_id: "STU001".parse().unwrap(),
            role: Role::Student,
            class_id: None,
            password_hash: "hash".into(),
            reset_code: Some("123456".into()),
            reset_code_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(UserResponse::new(user, None)).unwrap();
        assert_eq!(json["uniqueId"], "STU001");
        assert!(json["class"].is_null());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("resetCode").is_none());
    }
}
