//! Validated value types for domain primitives.
//!
//! [`UniqueId`] is the institutional identifier users log in with. Its prefix
//! encodes the account's role (`STU`, `FAC`, `ADM`), which
//! [`UniqueId::matches_role`] checks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::users::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    InvalidUniqueId(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUniqueId(msg) => write!(f, "Invalid unique ID: {}", msg),
        }
    }
}

/// An institutional identifier such as `STU001`.
///
/// Surrounding whitespace is stripped and letters are uppercased; the value
/// must be non-empty and free of inner whitespace.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
#[schema(value_type = String, example = "STU001")]
pub struct UniqueId(String);

impl UniqueId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueTypeError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(ValueTypeError::InvalidUniqueId(
                "unique ID cannot be empty".into(),
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValueTypeError::InvalidUniqueId(format!(
                "'{}' must not contain whitespace",
                trimmed
            )));
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier carries the prefix required for `role`.
    pub fn matches_role(&self, role: Role) -> bool {
        self.0.starts_with(role.id_prefix())
    }
}

impl fmt::Debug for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniqueId({})", self.0)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UniqueId {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UniqueId {
    type Error = ValueTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UniqueId> for String {
    fn from(id: UniqueId) -> String {
        id.0
    }
}

impl AsRef<str> for UniqueId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
